use std::fmt;
use std::time::Duration;

/// Counters collected during one `solve` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolverStatistics {
    /// Branching nodes opened.
    pub nodes: u64,
    /// Propagation failures (dead ends).
    pub fails: u64,
    /// Alternatives re-tried after a failure.
    pub backtracks: u64,
    /// Constraint propagator executions.
    pub propagations: u64,
    /// Deepest decision level reached.
    pub max_depth: u64,
    pub time_total: Duration,
}

impl SolverStatistics {
    #[inline]
    pub fn on_node(&mut self) {
        self.nodes = self.nodes.saturating_add(1);
    }

    #[inline]
    pub fn on_fail(&mut self) {
        self.fails = self.fails.saturating_add(1);
    }

    #[inline]
    pub fn on_backtrack(&mut self) {
        self.backtracks = self.backtracks.saturating_add(1);
    }

    #[inline]
    pub fn on_propagation(&mut self) {
        self.propagations = self.propagations.saturating_add(1);
    }

    #[inline]
    pub fn on_depth_update(&mut self, depth: u64) {
        self.max_depth = self.max_depth.max(depth);
    }
}

impl fmt::Display for SolverStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nodes={} fails={} backtracks={} propagations={} max_depth={} time={:?}",
            self.nodes,
            self.fails,
            self.backtracks,
            self.propagations,
            self.max_depth,
            self.time_total
        )
    }
}
