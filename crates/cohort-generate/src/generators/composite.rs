use cohort_core::{CaseTransform, GeneratedValue};

use crate::errors::{GenerationError, Result};
use crate::generators::{GenerationContext, ValueGenerator};

/// Joins one value from each child with a separator.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeGenerator {
    children: Vec<ValueGenerator>,
    separator: Option<String>,
    transform: CaseTransform,
}

impl CompositeGenerator {
    pub fn new(children: Vec<ValueGenerator>) -> Self {
        Self {
            children,
            separator: None,
            transform: CaseTransform::None,
        }
    }

    pub fn children(&self) -> &[ValueGenerator] {
        &self.children
    }

    pub fn separator(&self) -> Option<&str> {
        self.separator.as_deref()
    }

    pub(crate) fn joined_by(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    pub(crate) fn from(mut self, children: Vec<ValueGenerator>) -> Self {
        self.children = children;
        self
    }

    pub(crate) fn transformed_as(mut self, transform: CaseTransform) -> Self {
        self.transform = transform;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.separator.is_none() {
            return Err(GenerationError::MissingSeparator);
        }
        if self.children.is_empty() {
            return Err(GenerationError::InvalidOperation(
                "composite generators need at least one child".to_string(),
            ));
        }
        for child in &self.children {
            if matches!(child, ValueGenerator::Entity(_)) {
                return Err(GenerationError::InvalidOperation(
                    "entity generators cannot be joined into a composite".to_string(),
                ));
            }
            child.validate()?;
        }
        Ok(())
    }

    /// Each child generates `n` values; value `j` joins the `j`-th value of
    /// every child in child order.
    pub(crate) fn generate(
        &self,
        n: usize,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<Vec<GeneratedValue>> {
        let separator = self
            .separator
            .as_deref()
            .ok_or(GenerationError::MissingSeparator)?;
        if self.children.is_empty() {
            return Err(GenerationError::InvalidOperation(
                "composite generators need at least one child".to_string(),
            ));
        }

        let mut parts: Vec<Vec<String>> = vec![Vec::with_capacity(self.children.len()); n];
        for child in &self.children {
            for (slot, value) in parts.iter_mut().zip(child.generate(n, ctx)?) {
                match value {
                    GeneratedValue::Record(_) => {
                        return Err(GenerationError::InvalidOperation(
                            "records cannot be joined into a composite".to_string(),
                        ));
                    }
                    value => slot.push(value.to_string()),
                }
            }
        }

        Ok(parts
            .into_iter()
            .map(|slot| GeneratedValue::Text(self.transform.apply(slot.join(separator))))
            .collect())
    }
}
