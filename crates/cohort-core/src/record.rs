use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::value::GeneratedValue;

/// Entity record preserving attribute insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, GeneratedValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Appends an attribute. Callers are responsible for name uniqueness.
    pub fn push(&mut self, name: impl Into<String>, value: GeneratedValue) {
        self.fields.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&GeneratedValue> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GeneratedValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (idx, (key, value)) in self.fields.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_in_insertion_order() {
        let mut record = Record::new();
        record.push("name", GeneratedValue::Text("ana".to_string()));
        record.push("age", GeneratedValue::Int(31));

        let json = serde_json::to_string(&record).expect("serialize record");
        assert_eq!(json, r#"{"name":"ana","age":31}"#);
        assert_eq!(record.to_string(), "{name: ana, age: 31}");
    }

    #[test]
    fn lookup_by_name() {
        let mut record = Record::with_capacity(1);
        record.push("age", GeneratedValue::Int(7));
        assert_eq!(record.get("age").and_then(GeneratedValue::as_i64), Some(7));
        assert!(record.get("weight").is_none());
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["age"]);
    }
}
