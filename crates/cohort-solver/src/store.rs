use crate::model::{Domain, VarId};

/// Marker returned when a domain becomes empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Conflict;

/// Mutable domains for one search, with a trail of previous bounds.
///
/// Every narrowing pushes the old domain onto the trail so a search frame
/// can be restored by truncating back to a mark. Variables whose bounds
/// changed since the last drain are queued in `dirty`.
#[derive(Debug, Clone)]
pub(crate) struct DomainStore {
    domains: Vec<Domain>,
    trail: Vec<(usize, Domain)>,
    dirty: Vec<usize>,
}

impl DomainStore {
    pub fn new(domains: &[Domain]) -> Self {
        Self {
            domains: domains.to_vec(),
            trail: Vec::new(),
            dirty: Vec::new(),
        }
    }

    #[inline]
    pub fn domain(&self, var: VarId) -> Domain {
        self.domains[var.0]
    }

    pub fn has_empty_domain(&self) -> bool {
        self.domains.iter().any(Domain::is_empty)
    }

    /// Raises the lower bound. Returns whether the domain changed.
    pub fn set_min(&mut self, var: VarId, value: i64) -> Result<bool, Conflict> {
        let current = self.domains[var.0];
        if value <= current.lo {
            return Ok(false);
        }
        if value > current.hi {
            return Err(Conflict);
        }
        self.update(var.0, Domain::new(value, current.hi));
        Ok(true)
    }

    /// Lowers the upper bound. Returns whether the domain changed.
    pub fn set_max(&mut self, var: VarId, value: i64) -> Result<bool, Conflict> {
        let current = self.domains[var.0];
        if value >= current.hi {
            return Ok(false);
        }
        if value < current.lo {
            return Err(Conflict);
        }
        self.update(var.0, Domain::new(current.lo, value));
        Ok(true)
    }

    pub fn restrict(&mut self, var: VarId, lo: i64, hi: i64) -> Result<(), Conflict> {
        self.set_min(var, lo)?;
        self.set_max(var, hi)?;
        Ok(())
    }

    /// Removes `value` when it sits on a bound; interior holes are not kept.
    pub fn remove_value(&mut self, var: VarId, value: i64) -> Result<(), Conflict> {
        let current = self.domains[var.0];
        if current.lo == value {
            self.set_min(var, value.saturating_add(1))?;
        } else if current.hi == value {
            self.set_max(var, value.saturating_sub(1))?;
        }
        Ok(())
    }

    /// Index of the first unfixed variable at or after `from`.
    pub fn first_unfixed(&self, from: usize) -> Option<usize> {
        self.domains
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, domain)| !domain.is_fixed())
            .map(|(idx, _)| idx)
    }

    #[inline]
    pub fn mark(&self) -> usize {
        self.trail.len()
    }

    pub fn undo_to(&mut self, mark: usize) {
        while self.trail.len() > mark {
            if let Some((idx, previous)) = self.trail.pop() {
                self.domains[idx] = previous;
            }
        }
        self.dirty.clear();
    }

    pub fn take_dirty(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.dirty)
    }

    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    pub fn values(&self) -> Vec<i64> {
        self.domains.iter().map(|domain| domain.lo).collect()
    }

    fn update(&mut self, idx: usize, domain: Domain) {
        self.trail.push((idx, self.domains[idx]));
        self.domains[idx] = domain;
        self.dirty.push(idx);
    }
}
