use cohort_core::GeneratedValue;

use crate::allocation::{AllocationPlan, Backend};
use crate::errors::{GenerationError, Result};
use crate::generators::{GenerationContext, solve_ranges};

/// Ordered generated values laid out in bucket order.
pub type Sample = Vec<GeneratedValue>;

/// Fills every bucket of `plan` and returns the values in slot order.
///
/// The direct backend calls each non-empty bucket's generator once with the
/// bucket count. The constraint backend declares one variable per slot on a
/// single fresh model and solves it once.
pub fn distribute(plan: &AllocationPlan<'_>, ctx: &mut GenerationContext<'_>) -> Result<Sample> {
    match plan.backend {
        Backend::Direct => distribute_direct(plan, ctx),
        Backend::Constraint => distribute_constrained(plan, ctx),
    }
}

fn distribute_direct(plan: &AllocationPlan<'_>, ctx: &mut GenerationContext<'_>) -> Result<Sample> {
    let mut sample = Vec::with_capacity(plan.total);
    for bucket in plan.buckets.iter().filter(|bucket| bucket.count > 0) {
        debug_assert_eq!(sample.len(), bucket.offset);
        sample.extend(bucket.generator.generate(bucket.count, ctx)?);
    }
    Ok(sample)
}

fn distribute_constrained(
    plan: &AllocationPlan<'_>,
    ctx: &mut GenerationContext<'_>,
) -> Result<Sample> {
    let ranges = plan
        .buckets
        .iter()
        .filter(|bucket| bucket.count > 0)
        .map(|bucket| {
            bucket
                .generator
                .as_constrained()
                .map(|constrained| (constrained.min(), constrained.max(), bucket.count))
                .ok_or(GenerationError::MixedBackendUnsupported)
        })
        .collect::<Result<Vec<_>>>()?;
    solve_ranges("distribution", &ranges, ctx)
}
