use std::fmt;

use serde::Serialize;

use crate::record::Record;

/// A single generated value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GeneratedValue {
    Int(i64),
    Text(String),
    Record(Record),
}

impl GeneratedValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            GeneratedValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GeneratedValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            GeneratedValue::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GeneratedValue::Int(_) => "int",
            GeneratedValue::Text(_) => "text",
            GeneratedValue::Record(_) => "record",
        }
    }
}

impl fmt::Display for GeneratedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratedValue::Int(value) => write!(f, "{value}"),
            GeneratedValue::Text(value) => f.write_str(value),
            GeneratedValue::Record(record) => write!(f, "{record}"),
        }
    }
}

impl From<i64> for GeneratedValue {
    fn from(value: i64) -> Self {
        GeneratedValue::Int(value)
    }
}

impl From<String> for GeneratedValue {
    fn from(value: String) -> Self {
        GeneratedValue::Text(value)
    }
}

impl From<Record> for GeneratedValue {
    fn from(value: Record) -> Self {
        GeneratedValue::Record(value)
    }
}
