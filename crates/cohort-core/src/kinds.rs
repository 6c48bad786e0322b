use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Semantic kind of value requested from a fact provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FactKind {
    Text,
    FirstName,
    LastName,
    FullName,
    Integer,
}

impl FactKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::FullName => "full_name",
            Self::Integer => "integer",
        }
    }

    /// Returns true for kinds that produce strings.
    pub fn is_textual(self) -> bool {
        !matches!(self, Self::Integer)
    }

    /// Returns true for kinds whose provider honours bound options.
    pub fn accepts_options(self) -> bool {
        matches!(self, Self::Text | Self::Integer)
    }
}

impl fmt::Display for FactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FactKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "text" => Ok(Self::Text),
            "first_name" => Ok(Self::FirstName),
            "last_name" => Ok(Self::LastName),
            "full_name" | "name" => Ok(Self::FullName),
            "integer" => Ok(Self::Integer),
            other => Err(Error::UnknownKind(other.to_string())),
        }
    }
}

/// Bound options handed to a fact provider.
///
/// For text kinds the fields are lengths in characters; for the integer kind
/// `at_least`/`at_most` are the inclusive numeric bounds and `exactly` is
/// unused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exactly: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_least: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_most: Option<i64>,
}

impl FactOptions {
    pub fn exactly(value: i64) -> Self {
        Self {
            exactly: Some(value),
            at_least: None,
            at_most: None,
        }
    }

    pub fn between(at_least: i64, at_most: i64) -> Self {
        Self {
            exactly: None,
            at_least: Some(at_least),
            at_most: Some(at_most),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exactly.is_none() && self.at_least.is_none() && self.at_most.is_none()
    }
}

/// Case folding applied to generated strings.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum CaseTransform {
    #[default]
    None,
    Upper,
    Lower,
}

impl CaseTransform {
    pub fn apply(self, value: String) -> String {
        match self {
            Self::None => value,
            Self::Upper => value.to_uppercase(),
            Self::Lower => value.to_lowercase(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl FromStr for CaseTransform {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "none" => Ok(Self::None),
            "upper" | "uppercase" => Ok(Self::Upper),
            "lower" | "lowercase" => Ok(Self::Lower),
            other => Err(Error::UnknownTransform(other.to_string())),
        }
    }
}
