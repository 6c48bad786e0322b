use std::cell::Cell;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use cohort_solver::{Model, Solution, SolveStatus, Solver, ValueOrder, VarId};

/// Handle to a variable declared on a [`ConstraintModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarHandle(usize);

impl VarHandle {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Why a constraint model produced no assignment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveFailure {
    #[error("no assignment satisfies the model")]
    Unsatisfiable,
    #[error("solver stopped: {0}")]
    Terminated(String),
}

/// Factory for fresh constraint models.
pub trait ConstraintEngine {
    fn new_model(&self, name: &str) -> Box<dyn ConstraintModel + '_>;
}

/// One satisfaction problem over bounded integer variables.
///
/// A model is solved at most once; values are read back after a
/// successful `solve`.
pub trait ConstraintModel {
    fn declare_int_var(&mut self, min: i64, max: i64) -> VarHandle;
    fn solve(&mut self) -> Result<(), SolveFailure>;
    fn value_of(&self, handle: VarHandle) -> Option<i64>;

    /// Search nodes spent by the last `solve`, when the engine tracks them.
    fn nodes_explored(&self) -> u64 {
        0
    }
}

/// [`ConstraintEngine`] backed by `cohort-solver`.
#[derive(Debug, Clone)]
pub struct SolverAdapter {
    seed: u64,
    time_limit: Option<Duration>,
    value_order: SolverValueOrder,
    models_created: Cell<u64>,
}

/// How the adapter picks values while branching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SolverValueOrder {
    /// Smallest value first: the first solution a plain solver returns.
    Min,
    /// Seeded uniform choice, so buckets get varied values.
    #[default]
    Random,
}

impl SolverAdapter {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            time_limit: None,
            value_order: SolverValueOrder::default(),
            models_created: Cell::new(0),
        }
    }

    pub fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit = limit;
        self
    }

    pub fn with_value_order(mut self, order: SolverValueOrder) -> Self {
        self.value_order = order;
        self
    }

    fn next_seed(&self) -> u64 {
        let index = self.models_created.get();
        self.models_created.set(index + 1);
        let mut hash = self.seed ^ index.wrapping_mul(0x9e3779b97f4a7c15);
        hash = hash.wrapping_mul(0x100000001b3);
        hash
    }
}

impl ConstraintEngine for SolverAdapter {
    fn new_model(&self, name: &str) -> Box<dyn ConstraintModel + '_> {
        let order = match self.value_order {
            SolverValueOrder::Min => ValueOrder::Min,
            SolverValueOrder::Random => ValueOrder::Random {
                seed: self.next_seed(),
            },
        };
        let mut solver = Solver::new().with_value_order(order);
        if let Some(limit) = self.time_limit {
            solver = solver.with_time_limit(limit);
        }
        Box::new(SolverModel {
            model: Model::new(name),
            solver,
            vars: Vec::new(),
            solution: None,
            nodes: 0,
        })
    }
}

struct SolverModel {
    model: Model,
    solver: Solver,
    vars: Vec<VarId>,
    solution: Option<Solution>,
    nodes: u64,
}

impl ConstraintModel for SolverModel {
    fn declare_int_var(&mut self, min: i64, max: i64) -> VarHandle {
        let handle = VarHandle(self.vars.len());
        self.vars.push(self.model.int_var(min, max));
        handle
    }

    fn solve(&mut self) -> Result<(), SolveFailure> {
        let outcome = self.solver.solve(&self.model);
        self.nodes = outcome.statistics.nodes;
        debug!(
            model = %self.model.name(),
            vars = self.model.num_vars(),
            statistics = %outcome.statistics,
            "constraint model solved"
        );
        match outcome.status {
            SolveStatus::Satisfied(solution) => {
                self.solution = Some(solution);
                Ok(())
            }
            SolveStatus::Unsatisfiable => Err(SolveFailure::Unsatisfiable),
            SolveStatus::Terminated(reason) => Err(SolveFailure::Terminated(reason.to_string())),
        }
    }

    fn value_of(&self, handle: VarHandle) -> Option<i64> {
        let var = self.vars.get(handle.0)?;
        self.solution.as_ref()?.value(*var)
    }

    fn nodes_explored(&self) -> u64 {
        self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_reads_back_values_in_bounds() {
        let adapter = SolverAdapter::new(5);
        let mut model = adapter.new_model("ages");
        let young = model.declare_int_var(1, 19);
        let old = model.declare_int_var(60, 100);
        assert_eq!(model.value_of(young), None);

        model.solve().expect("satisfiable");
        assert!((1..=19).contains(&model.value_of(young).expect("young")));
        assert!((60..=100).contains(&model.value_of(old).expect("old")));
        assert_eq!(model.value_of(VarHandle::new(7)), None);
    }

    #[test]
    fn min_order_returns_lower_bounds() {
        let adapter = SolverAdapter::new(0).with_value_order(SolverValueOrder::Min);
        let mut model = adapter.new_model("ages");
        let handles: Vec<_> = (0..3).map(|_| model.declare_int_var(20, 39)).collect();
        model.solve().expect("satisfiable");
        for handle in handles {
            assert_eq!(model.value_of(handle), Some(20));
        }
    }

    #[test]
    fn empty_range_is_unsatisfiable() {
        let adapter = SolverAdapter::new(0);
        let mut model = adapter.new_model("broken");
        model.declare_int_var(10, 1);
        assert_eq!(model.solve(), Err(SolveFailure::Unsatisfiable));
    }
}
