use cohort_core::GeneratedValue;
use tracing::debug;

use crate::allocation::{WeightEntry, WeightMode, allocate, check_table};
use crate::distribute::distribute;
use crate::errors::{GenerationError, Result};
use crate::generators::{GenerationContext, ValueGenerator};

/// Weighted table of generators with an optional default fill-in.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    mode: WeightMode,
    entries: Vec<WeightEntry>,
    default: Option<Box<ValueGenerator>>,
}

impl Distribution {
    /// Relative weights; shares are `w / Σw`.
    pub fn weighted() -> Self {
        Self::with_mode(WeightMode::Absolute)
    }

    /// Weights are percentages summing to 100.
    pub fn percentages() -> Self {
        Self::with_mode(WeightMode::Percentage)
    }

    pub fn with_mode(mode: WeightMode) -> Self {
        Self {
            mode,
            entries: Vec::new(),
            default: None,
        }
    }

    /// Appends an entry. Weights are checked when the table is validated or
    /// allocated.
    pub fn add(mut self, generator: ValueGenerator, weight: f64) -> Self {
        self.entries.push(WeightEntry { generator, weight });
        self
    }

    /// Generator that receives whatever percentage the entries leave over.
    pub fn with_default(mut self, generator: ValueGenerator) -> Self {
        self.default = Some(Box::new(generator));
        self
    }

    pub fn mode(&self) -> WeightMode {
        self.mode
    }

    pub fn entries(&self) -> &[WeightEntry] {
        &self.entries
    }

    pub fn default_generator(&self) -> Option<&ValueGenerator> {
        self.default.as_deref()
    }

    pub fn validate(&self) -> Result<()> {
        check_table(&self.entries, self.mode, self.default.as_deref())?;
        for entry in &self.entries {
            entry.generator.validate()?;
        }
        if let Some(default) = &self.default {
            default.validate()?;
        }
        Ok(())
    }

    pub fn generate(&self, n: usize, ctx: &mut GenerationContext<'_>) -> Result<Vec<GeneratedValue>> {
        if n < 1 {
            return Err(GenerationError::InvalidSampleSize(n));
        }
        self.validate()?;
        let plan = allocate(&self.entries, n, self.mode, self.default.as_deref())?;
        ctx.record_allocation();
        debug!(
            total = plan.total,
            backend = %plan.backend,
            counts = ?plan.counts(),
            "allocation planned"
        );
        distribute(&plan, ctx)
    }
}
