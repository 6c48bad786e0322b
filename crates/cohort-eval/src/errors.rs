use thiserror::Error;

/// Errors emitted while summarizing a dataset.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("invalid range '{label}': {reason}")]
    InvalidRange { label: String, reason: String },
    #[error("{0} generators cannot be summarized by range")]
    UnsupportedGenerator(String),
}

pub type Result<T> = std::result::Result<T, EvalError>;
