use cohort_core::{CaseTransform, FactKind, FactOptions, GeneratedValue};

use crate::errors::{GenerationError, Result};
use crate::generators::GenerationContext;

/// One provider draw per value, optionally case-folded.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveGenerator {
    kind: FactKind,
    options: FactOptions,
    transform: CaseTransform,
}

impl PrimitiveGenerator {
    pub fn new(kind: FactKind) -> Self {
        Self {
            kind,
            options: FactOptions::default(),
            transform: CaseTransform::None,
        }
    }

    pub fn kind(&self) -> FactKind {
        self.kind
    }

    pub fn options(&self) -> &FactOptions {
        &self.options
    }

    pub fn transform(&self) -> CaseTransform {
        self.transform
    }

    pub(crate) fn of_length(mut self, len: i64, upper: Option<i64>) -> Result<Self> {
        if len < 0 {
            return Err(GenerationError::InvalidBounds {
                min: 0,
                max: len,
            });
        }
        self.options = match upper {
            None => FactOptions::exactly(len),
            Some(upper) if upper < len => {
                return Err(GenerationError::InvalidBounds {
                    min: len,
                    max: upper,
                });
            }
            Some(upper) => FactOptions::between(len, upper),
        };
        Ok(self)
    }

    pub(crate) fn between(mut self, min: i64, max: i64) -> Result<Self> {
        if max < min {
            return Err(GenerationError::InvalidBounds { min, max });
        }
        self.options = FactOptions::between(min, max);
        Ok(self)
    }

    pub(crate) fn transformed_as(mut self, transform: CaseTransform) -> Self {
        self.transform = transform;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !self.options.is_empty() && !self.kind.accepts_options() {
            return Err(GenerationError::InvalidOperation(format!(
                "{} generators take no bound options",
                self.kind
            )));
        }
        if !self.transform.is_none() && !self.kind.is_textual() {
            return Err(GenerationError::InvalidOperation(format!(
                "{} generators cannot be transformed",
                self.kind
            )));
        }
        if let (Some(min), Some(max)) = (self.options.at_least, self.options.at_most)
            && max < min
        {
            return Err(GenerationError::InvalidBounds { min, max });
        }
        Ok(())
    }

    pub(crate) fn generate(&self, n: usize, ctx: &mut GenerationContext<'_>) -> Vec<GeneratedValue> {
        (0..n)
            .map(|_| match ctx.draw(self.kind, &self.options) {
                GeneratedValue::Text(text) => GeneratedValue::Text(self.transform.apply(text)),
                other => other,
            })
            .collect()
    }
}
