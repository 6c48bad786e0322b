use thiserror::Error;

/// Errors raised while building a model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolverError {
    #[error("variable {index} is not declared on model '{model}'")]
    UnknownVariable { model: String, index: usize },
    #[error("unknown comparison operator '{0}'")]
    UnknownOperator(String),
    #[error("constraint has no variables")]
    EmptyConstraint,
}
