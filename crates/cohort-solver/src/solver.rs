use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::model::{Domain, Model, VarId};
use crate::stack::{Decision, SearchStack};
use crate::stats::SolverStatistics;
use crate::store::{Conflict, DomainStore};

const DEFAULT_CHECK_INTERVAL: u64 = 1024;

/// Value chosen first when branching on a variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueOrder {
    /// Smallest value first.
    #[default]
    Min,
    /// Largest value first.
    Max,
    /// Uniform value from the current domain, reproducible from `seed`.
    Random { seed: u64 },
}

/// A complete assignment, indexed by declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    values: Vec<i64>,
}

impl Solution {
    pub fn value(&self, var: VarId) -> Option<i64> {
        self.values.get(var.0).copied()
    }

    /// Values of `vars` in the given order; unknown handles are skipped.
    pub fn values(&self, vars: &[VarId]) -> Vec<i64> {
        vars.iter().filter_map(|var| self.value(*var)).collect()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Why a search stopped before proving anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    TimeLimit(Duration),
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::TimeLimit(limit) => {
                write!(f, "time limit of {} ms exceeded", limit.as_millis())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveStatus {
    Satisfied(Solution),
    Unsatisfiable,
    Terminated(TerminationReason),
}

/// Result of a `solve` call together with its statistics.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub statistics: SolverStatistics,
}

impl SolveOutcome {
    pub fn is_satisfied(&self) -> bool {
        matches!(self.status, SolveStatus::Satisfied(_))
    }

    pub fn solution(&self) -> Option<&Solution> {
        match &self.status {
            SolveStatus::Satisfied(solution) => Some(solution),
            _ => None,
        }
    }

    pub fn into_solution(self) -> Option<Solution> {
        match self.status {
            SolveStatus::Satisfied(solution) => Some(solution),
            _ => None,
        }
    }
}

/// Depth-first satisfaction search over a [`Model`].
///
/// Variables are branched in declaration order. Each branch fixes the
/// variable to the value picked by [`ValueOrder`] and keeps the two
/// remaining sub-ranges as alternatives for backtracking.
#[derive(Debug, Clone)]
pub struct Solver {
    time_limit: Option<Duration>,
    value_order: ValueOrder,
    check_interval: u64,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    pub fn new() -> Self {
        Self {
            time_limit: None,
            value_order: ValueOrder::Min,
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_value_order(mut self, order: ValueOrder) -> Self {
        self.value_order = order;
        self
    }

    /// Nodes explored between two clock reads.
    pub fn with_check_interval(mut self, interval: u64) -> Self {
        self.check_interval = interval.max(1);
        self
    }

    /// Searches for the first satisfying assignment.
    pub fn solve(&self, model: &Model) -> SolveOutcome {
        let start = Instant::now();
        let mut search = Search::new(model, self, start);
        let status = search.run();
        let mut statistics = search.stats;
        statistics.time_total = start.elapsed();

        debug!(
            model = %model.name(),
            vars = model.num_vars(),
            constraints = model.num_constraints(),
            satisfied = matches!(status, SolveStatus::Satisfied(_)),
            nodes = statistics.nodes,
            fails = statistics.fails,
            duration_ms = statistics.time_total.as_millis() as u64,
            "solve finished"
        );

        SolveOutcome { status, statistics }
    }
}

struct Search<'a> {
    model: &'a Model,
    store: DomainStore,
    stack: SearchStack,
    watchers: Vec<Vec<usize>>,
    queue: VecDeque<usize>,
    queued: Vec<bool>,
    rng: Option<ChaCha8Rng>,
    value_order: ValueOrder,
    time_limit: Option<Duration>,
    check_interval: u64,
    since_check: u64,
    start: Instant,
    stats: SolverStatistics,
}

impl<'a> Search<'a> {
    fn new(model: &'a Model, solver: &Solver, start: Instant) -> Self {
        let mut watchers = vec![Vec::new(); model.num_vars()];
        for (idx, constraint) in model.constraints().iter().enumerate() {
            let mut vars = constraint.vars();
            vars.sort();
            vars.dedup();
            for var in vars {
                watchers[var.index()].push(idx);
            }
        }

        let rng = match solver.value_order {
            ValueOrder::Random { seed } => Some(ChaCha8Rng::seed_from_u64(seed)),
            _ => None,
        };

        Self {
            model,
            store: DomainStore::new(model.domains()),
            stack: SearchStack::new(),
            watchers,
            queue: VecDeque::new(),
            queued: vec![false; model.num_constraints()],
            rng,
            value_order: solver.value_order,
            time_limit: solver.time_limit,
            check_interval: solver.check_interval,
            since_check: 0,
            start,
            stats: SolverStatistics::default(),
        }
    }

    fn run(&mut self) -> SolveStatus {
        if self.store.has_empty_domain() {
            return SolveStatus::Unsatisfiable;
        }
        for idx in 0..self.model.num_constraints() {
            self.enqueue(idx);
        }
        if self.propagate().is_err() {
            self.stats.on_fail();
            return SolveStatus::Unsatisfiable;
        }

        let mut cursor = 0;
        loop {
            if let Some(reason) = self.check_termination() {
                return SolveStatus::Terminated(reason);
            }

            let Some(var) = self.store.first_unfixed(cursor) else {
                return SolveStatus::Satisfied(Solution {
                    values: self.store.values(),
                });
            };

            self.stats.on_node();
            let domain = self.store.domain(VarId(var));
            let value = self.pick_value(domain);
            self.stack.push_frame(var, self.store.mark());
            self.stats.on_depth_update(self.stack.depth() as u64);

            if value < domain.hi {
                self.stack.push(Decision {
                    var,
                    lo: value + 1,
                    hi: domain.hi,
                });
            }
            if value > domain.lo {
                self.stack.push(Decision {
                    var,
                    lo: domain.lo,
                    hi: value - 1,
                });
            }

            cursor = var;
            if self.apply(var, value, value).is_ok() {
                continue;
            }

            match self.backtrack() {
                Some(resume) => cursor = resume,
                None => return SolveStatus::Unsatisfiable,
            }
        }
    }

    /// Restores the next viable alternative; `None` once the tree is exhausted.
    fn backtrack(&mut self) -> Option<usize> {
        self.stats.on_fail();
        loop {
            let frame = self.stack.top()?;
            match self.stack.pop_alternative() {
                Some(decision) => {
                    self.store.undo_to(frame.trail_mark);
                    self.stats.on_backtrack();
                    if self.apply(decision.var, decision.lo, decision.hi).is_ok() {
                        return Some(frame.var);
                    }
                    self.stats.on_fail();
                }
                None => {
                    self.store.undo_to(frame.trail_mark);
                    self.stack.pop_frame();
                }
            }
        }
    }

    fn apply(&mut self, var: usize, lo: i64, hi: i64) -> Result<(), Conflict> {
        self.store.clear_dirty();
        let result = self
            .store
            .restrict(VarId(var), lo, hi)
            .and_then(|_| self.propagate());
        if result.is_err() {
            self.reset_queue();
        }
        result
    }

    fn propagate(&mut self) -> Result<(), Conflict> {
        self.schedule_dirty();
        while let Some(idx) = self.queue.pop_front() {
            self.queued[idx] = false;
            self.stats.on_propagation();
            self.model.constraints()[idx].propagate(&mut self.store)?;
            self.schedule_dirty();
        }
        Ok(())
    }

    fn schedule_dirty(&mut self) {
        for var in self.store.take_dirty() {
            for pos in 0..self.watchers[var].len() {
                let idx = self.watchers[var][pos];
                self.enqueue(idx);
            }
        }
    }

    fn enqueue(&mut self, idx: usize) {
        if !self.queued[idx] {
            self.queued[idx] = true;
            self.queue.push_back(idx);
        }
    }

    fn reset_queue(&mut self) {
        for idx in self.queue.drain(..) {
            self.queued[idx] = false;
        }
        self.store.clear_dirty();
    }

    fn pick_value(&mut self, domain: Domain) -> i64 {
        match (self.value_order, self.rng.as_mut()) {
            (ValueOrder::Max, _) => domain.hi,
            (ValueOrder::Random { .. }, Some(rng)) => rng.random_range(domain.lo..=domain.hi),
            _ => domain.lo,
        }
    }

    fn check_termination(&mut self) -> Option<TerminationReason> {
        let limit = self.time_limit?;
        self.since_check += 1;
        if self.since_check < self.check_interval {
            return None;
        }
        self.since_check = 0;
        if self.start.elapsed() > limit {
            Some(TerminationReason::TimeLimit(limit))
        } else {
            None
        }
    }
}
