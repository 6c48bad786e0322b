use thiserror::Error;

/// Errors emitted while building or running generators.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("sample size must be at least 1 (got {0})")]
    InvalidSampleSize(usize),
    #[error("weight at position {index} must be positive and finite (got {weight})")]
    InvalidWeight { index: usize, weight: f64 },
    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),
    #[error("max ({max}) must be greater than or equal to min ({min})")]
    InvalidBounds { min: i64, max: i64 },
    #[error("composite generator has no separator")]
    MissingSeparator,
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("constrained and unconstrained generators cannot share one distribution")]
    MixedBackendUnsupported,
    #[error("distribution could not be solved: {0}")]
    UnsatisfiableDistribution(String),
    #[error("invalid plan: {0}")]
    InvalidPlan(String),
}

pub type Result<T> = std::result::Result<T, GenerationError>;
