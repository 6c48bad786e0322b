/// A pending alternative: narrow `var` to `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Decision {
    pub var: usize,
    pub lo: i64,
    pub hi: i64,
}

/// Bookkeeping for one decision level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Frame {
    /// Variable branched on at this level.
    pub var: usize,
    /// Trail length before the level's first decision was applied.
    pub trail_mark: usize,
    /// Index in `entries` where this level's alternatives begin.
    entry_start: usize,
}

/// Frame-structured LIFO stack of pending alternatives.
///
/// Alternatives for every level live in one linear vector; `frames`
/// records where each level starts so popping a level is a truncate.
#[derive(Debug, Clone, Default)]
pub(crate) struct SearchStack {
    entries: Vec<Decision>,
    frames: Vec<Frame>,
}

impl SearchStack {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn top(&self) -> Option<Frame> {
        self.frames.last().copied()
    }

    pub fn push_frame(&mut self, var: usize, trail_mark: usize) {
        self.frames.push(Frame {
            var,
            trail_mark,
            entry_start: self.entries.len(),
        });
    }

    pub fn pop_frame(&mut self) -> Option<Frame> {
        let frame = self.frames.pop()?;
        self.entries.truncate(frame.entry_start);
        Some(frame)
    }

    #[inline]
    pub fn push(&mut self, decision: Decision) {
        self.entries.push(decision);
    }

    /// Pops the next alternative of the current frame, if any remain.
    pub fn pop_alternative(&mut self) -> Option<Decision> {
        let frame = self.frames.last()?;
        if self.entries.len() > frame.entry_start {
            self.entries.pop()
        } else {
            None
        }
    }
}
