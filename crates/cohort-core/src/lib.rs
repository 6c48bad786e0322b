//! Core contracts shared across Cohort crates.
//!
//! This crate defines the generated value model, the entity record type and
//! the vocabulary used to talk to fact providers (kinds, bound options and
//! case transforms).

pub mod error;
pub mod kinds;
pub mod record;
pub mod value;

pub use error::{Error, Result};
pub use kinds::{CaseTransform, FactKind, FactOptions};
pub use record::Record;
pub use value::GeneratedValue;
