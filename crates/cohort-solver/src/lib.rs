//! Finite-domain integer constraint solver used by Cohort.
//!
//! Core flow
//! - Declare bounded integer variables on a [`Model`].
//! - Post constraints (`arithm`, `all_different`, `sum`).
//! - Run [`Solver::solve`] once; read values from the returned [`Solution`].
//!
//! Domains are kept as integer intervals and narrowed by bounds propagation.
//! Search is a depth-first, frame-structured descent with a trail for undo,
//! so a model with tens of thousands of variables never recurses.

pub mod constraint;
pub mod error;
pub mod model;
pub mod solver;
mod stack;
pub mod stats;
mod store;

pub use constraint::{Cmp, Constraint, Term};
pub use error::SolverError;
pub use model::{Domain, Model, VarId};
pub use solver::{Solution, SolveOutcome, SolveStatus, Solver, TerminationReason, ValueOrder};
pub use stats::SolverStatistics;
