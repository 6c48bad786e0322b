use thiserror::Error;

/// Core error type for parsing shared vocabulary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A fact kind name was not recognized.
    #[error("unknown fact kind: {0}")]
    UnknownKind(String),
    /// A case transform name was not recognized.
    #[error("unknown case transform: {0}")]
    UnknownTransform(String),
}

/// Convenience alias for results returned by core helpers.
pub type Result<T> = std::result::Result<T, Error>;
