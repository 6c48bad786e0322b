use cohort_core::GeneratedValue;
use tracing::debug;

use crate::errors::{GenerationError, Result};
use crate::generators::GenerationContext;

/// Integer whose values come out of one joint constraint model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstrainedNumeric {
    min: i64,
    max: i64,
}

impl ConstrainedNumeric {
    pub fn new(min: i64, max: i64) -> Result<Self> {
        if max < min {
            return Err(GenerationError::InvalidBounds { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max < self.min {
            return Err(GenerationError::InvalidBounds {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    pub(crate) fn generate(
        &self,
        n: usize,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<Vec<GeneratedValue>> {
        solve_ranges("constrained_integer", &[(self.min, self.max, n)], ctx)
    }
}

/// Declares `count` slots per `(min, max, count)` range on a fresh model,
/// solves it once and reads the slots back in declaration order.
pub(crate) fn solve_ranges(
    name: &str,
    ranges: &[(i64, i64, usize)],
    ctx: &mut GenerationContext<'_>,
) -> Result<Vec<GeneratedValue>> {
    let mut model = ctx.new_model(name);
    let slots = ranges.iter().map(|(_, _, count)| count).sum();
    let mut handles = Vec::with_capacity(slots);
    for (min, max, count) in ranges {
        for _ in 0..*count {
            handles.push(model.declare_int_var(*min, *max));
        }
    }

    let solved = model.solve();
    ctx.record_solve(model.nodes_explored());
    solved.map_err(|failure| GenerationError::UnsatisfiableDistribution(failure.to_string()))?;
    debug!(model = %name, slots, nodes = model.nodes_explored(), "slots solved");

    handles
        .into_iter()
        .enumerate()
        .map(|(slot, handle)| {
            model.value_of(handle).map(GeneratedValue::Int).ok_or_else(|| {
                GenerationError::UnsatisfiableDistribution(format!(
                    "solver returned no value for slot {slot}"
                ))
            })
        })
        .collect()
}
