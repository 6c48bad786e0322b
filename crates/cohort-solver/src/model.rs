use std::fmt;

use crate::constraint::{Cmp, Constraint, Term};
use crate::error::SolverError;
use crate::solver::Solution;

/// Handle to an integer variable declared on a [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Closed integer interval `[lo, hi]`. Empty when `lo > hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    pub lo: i64,
    pub hi: i64,
}

impl Domain {
    pub const fn new(lo: i64, hi: i64) -> Self {
        Self { lo, hi }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lo > self.hi
    }

    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.lo == self.hi
    }

    #[inline]
    pub fn contains(&self, value: i64) -> bool {
        self.lo <= value && value <= self.hi
    }

    /// Number of values in the domain, saturating at `u64::MAX`.
    pub fn size(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        let width = (self.hi as i128) - (self.lo as i128) + 1;
        u64::try_from(width).unwrap_or(u64::MAX)
    }
}

/// A constraint model: declared variables plus posted constraints.
///
/// A model is built once and may be solved any number of times; solving
/// never mutates it.
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    domains: Vec<Domain>,
    constraints: Vec<Constraint>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domains: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declares a variable with inclusive bounds. An inverted range is
    /// accepted and makes the model unsatisfiable.
    pub fn int_var(&mut self, min: i64, max: i64) -> VarId {
        let id = VarId(self.domains.len());
        self.domains.push(Domain::new(min, max));
        id
    }

    pub fn int_var_array(&mut self, count: usize, min: i64, max: i64) -> Vec<VarId> {
        self.domains.reserve(count);
        (0..count).map(|_| self.int_var(min, max)).collect()
    }

    /// Declares a variable fixed to `value`.
    pub fn constant(&mut self, value: i64) -> VarId {
        self.int_var(value, value)
    }

    pub fn post(&mut self, constraint: Constraint) -> Result<(), SolverError> {
        let vars = constraint.vars();
        if vars.is_empty() {
            return Err(SolverError::EmptyConstraint);
        }
        for var in vars {
            self.check_var(var)?;
        }
        self.constraints.push(constraint);
        Ok(())
    }

    /// Posts `left op right`, mirroring the textual operator form (`"<="`).
    pub fn arithm(
        &mut self,
        left: VarId,
        op: &str,
        right: impl Into<Term>,
    ) -> Result<(), SolverError> {
        let op: Cmp = op.parse()?;
        self.post(Constraint::arithm(left, op, right))
    }

    pub fn num_vars(&self) -> usize {
        self.domains.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn domain(&self, var: VarId) -> Option<Domain> {
        self.domains.get(var.0).copied()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub(crate) fn domains(&self) -> &[Domain] {
        &self.domains
    }

    /// Checks a full assignment against every declared bound and constraint.
    pub fn check(&self, solution: &Solution) -> bool {
        let values = solution.as_slice();
        values.len() == self.domains.len()
            && self
                .domains
                .iter()
                .zip(values)
                .all(|(domain, value)| domain.contains(*value))
            && self
                .constraints
                .iter()
                .all(|constraint| constraint.is_satisfied(values))
    }

    fn check_var(&self, var: VarId) -> Result<(), SolverError> {
        if var.0 < self.domains.len() {
            Ok(())
        } else {
            Err(SolverError::UnknownVariable {
                model: self.name.clone(),
                index: var.0,
            })
        }
    }
}
