use std::time::Instant;

use cohort_core::{GeneratedValue, Record};
use tracing::info;

use crate::errors::{GenerationError, Result};
use crate::generators::{GenerationContext, ValueGenerator};

/// Ordered named attributes zipped into records by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityGenerator {
    name: Option<String>,
    attributes: Vec<(String, ValueGenerator)>,
}

impl EntityGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            attributes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("entity")
    }

    /// Appends an attribute; names must be unique within the entity.
    pub fn attribute(mut self, name: impl Into<String>, generator: ValueGenerator) -> Result<Self> {
        let name = name.into();
        if self.attributes.iter().any(|(existing, _)| *existing == name) {
            return Err(GenerationError::InvalidOperation(format!(
                "attribute '{name}' is already defined on {}",
                self.name()
            )));
        }
        self.attributes.push((name, generator));
        Ok(self)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &ValueGenerator)> {
        self.attributes
            .iter()
            .map(|(name, generator)| (name.as_str(), generator))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.attributes.is_empty() {
            return Err(GenerationError::InvalidOperation(format!(
                "{} has no attributes",
                self.name()
            )));
        }
        for (_, generator) in &self.attributes {
            generator.validate()?;
        }
        Ok(())
    }

    /// Generates `n` records. Record `j` holds the `j`-th value of every
    /// attribute's sample, in attribute order.
    pub fn generate_records(
        &self,
        n: usize,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<Vec<Record>> {
        if n < 1 {
            return Err(GenerationError::InvalidSampleSize(n));
        }
        self.validate()?;

        let mut columns: Vec<std::vec::IntoIter<GeneratedValue>> =
            Vec::with_capacity(self.attributes.len());
        for (name, generator) in &self.attributes {
            let started = Instant::now();
            let values = generator.generate(n, ctx)?;
            info!(
                entity = %self.name(),
                attribute = %name,
                generator = generator.kind_name(),
                values = values.len(),
                duration_ms = started.elapsed().as_millis() as u64,
                "attribute generated"
            );
            columns.push(values.into_iter());
        }

        let mut records = Vec::with_capacity(n);
        for _ in 0..n {
            let mut record = Record::with_capacity(self.attributes.len());
            for ((name, _), column) in self.attributes.iter().zip(columns.iter_mut()) {
                let value = column.next().ok_or_else(|| {
                    GenerationError::InvalidOperation(format!(
                        "attribute '{name}' produced fewer than {n} values"
                    ))
                })?;
                record.push(name.clone(), value);
            }
            records.push(record);
        }
        Ok(records)
    }
}
