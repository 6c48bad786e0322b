//! Weighted synthetic dataset generation for Cohort.
//!
//! Generators are composed with a consuming builder API (or built from a
//! `cohort-plan` dataset plan). Weighted distributions are allocated into
//! exact per-bucket counts and filled either by direct provider draws or by
//! one jointly solved constraint model.

pub mod allocation;
pub mod builder;
pub mod constraint;
pub mod distribute;
pub mod engine;
pub mod errors;
pub mod generators;
pub mod model;
pub mod provider;

pub use allocation::{AllocationPlan, Backend, Bucket, WeightEntry, WeightMode, allocate};
pub use builder::{build_entity, build_generator};
pub use constraint::{
    ConstraintEngine, ConstraintModel, SolveFailure, SolverAdapter, SolverValueOrder, VarHandle,
};
pub use distribute::{Sample, distribute};
pub use engine::{GenerationEngine, GenerationResult};
pub use errors::GenerationError;
pub use generators::{
    CompositeGenerator, ConstrainedNumeric, Distribution, EntityGenerator, GenerationContext,
    GenerationStats, PrimitiveGenerator, ValueGenerator,
};
pub use model::{GenerateOptions, GenerationReport};
pub use provider::{FactProvider, FakerLocale, FakerProvider};
