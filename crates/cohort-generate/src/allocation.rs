//! Weighted bucket allocation.
//!
//! Turns a weight table and a sample size into exact per-entry counts using
//! cumulative flooring: entry `i` ends at `floor(F_i * total / W)` where
//! `F_i` is the running weight, and the last entry always ends at `total`.
//! Counts therefore sum to the requested total for any skew.
//!
//! Whole-number weights are floored in integer arithmetic. Fractional
//! weights go through `f64` with a small tolerance so that shares such as
//! `0.1 + 0.2` still land on their whole-number boundary.

use std::fmt;

use serde::Serialize;

pub use cohort_plan::WeightMode;

use crate::errors::{GenerationError, Result};
use crate::generators::ValueGenerator;

const PERCENT_SCALE: f64 = 100.0;
const FLOOR_EPSILON: f64 = 1e-9;
/// Largest weight that `f64` represents without gaps (2^53).
const MAX_EXACT_WEIGHT: f64 = 9_007_199_254_740_992.0;

/// A generator and its declared weight.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightEntry {
    pub generator: ValueGenerator,
    pub weight: f64,
}

/// Strategy used to fill the buckets of one allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Each bucket's generator is called independently.
    Direct,
    /// Every slot becomes a variable of one jointly solved model.
    Constraint,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Direct => f.write_str("direct"),
            Backend::Constraint => f.write_str("constraint"),
        }
    }
}

/// Contiguous slice `[offset, offset + count)` of the sample owned by one
/// generator.
#[derive(Debug, Clone, Copy)]
pub struct Bucket<'a> {
    pub generator: &'a ValueGenerator,
    pub weight: f64,
    pub count: usize,
    pub offset: usize,
    /// Synthesized from the default generator of a percentage table.
    pub is_default: bool,
}

impl Bucket<'_> {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.count
    }
}

/// Per-entry counts for one `generate(n)` call, in entry order.
#[derive(Debug, Clone)]
pub struct AllocationPlan<'a> {
    pub total: usize,
    pub backend: Backend,
    pub buckets: Vec<Bucket<'a>>,
}

impl AllocationPlan<'_> {
    pub fn counts(&self) -> Vec<usize> {
        self.buckets.iter().map(|bucket| bucket.count).collect()
    }

    pub fn allocated(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.count).sum()
    }
}

/// Chooses the backend for a set of generators: all constrained uses the
/// solver, none uses direct calls, anything else is rejected.
pub fn select_backend<'a>(
    generators: impl IntoIterator<Item = &'a ValueGenerator>,
) -> Result<Backend> {
    let (mut constrained, mut direct) = (0usize, 0usize);
    for generator in generators {
        if generator.is_constrained() {
            constrained += 1;
        } else {
            direct += 1;
        }
    }
    match (constrained, direct) {
        (0, _) => Ok(Backend::Direct),
        (_, 0) => Ok(Backend::Constraint),
        _ => Err(GenerationError::MixedBackendUnsupported),
    }
}

/// Validates a weight table without allocating and returns its backend.
pub fn check_table(
    entries: &[WeightEntry],
    mode: WeightMode,
    default: Option<&ValueGenerator>,
) -> Result<Backend> {
    let table = resolve_table(entries, mode, default)?;
    select_backend(table.rows.iter().map(|row| row.generator))
}

/// Computes the allocation of `total` samples over `entries`.
pub fn allocate<'a>(
    entries: &'a [WeightEntry],
    total: usize,
    mode: WeightMode,
    default: Option<&'a ValueGenerator>,
) -> Result<AllocationPlan<'a>> {
    if total < 1 {
        return Err(GenerationError::InvalidSampleSize(total));
    }
    let table = resolve_table(entries, mode, default)?;
    let backend = select_backend(table.rows.iter().map(|row| row.generator))?;

    let ends = cumulative_ends(&table, total);
    let mut buckets = Vec::with_capacity(table.rows.len());
    let mut allocated = 0usize;
    for (row, end) in table.rows.into_iter().zip(ends) {
        let target = end.clamp(allocated, total);
        buckets.push(Bucket {
            generator: row.generator,
            weight: row.weight,
            count: target - allocated,
            offset: allocated,
            is_default: row.is_default,
        });
        allocated = target;
    }

    Ok(AllocationPlan {
        total,
        backend,
        buckets,
    })
}

/// End offset of every row; the last row always ends at `total`.
fn cumulative_ends(table: &ResolvedTable<'_>, total: usize) -> Vec<usize> {
    let mut ends = exact_ends(table, total).unwrap_or_else(|| {
        let mut running = 0.0f64;
        table
            .rows
            .iter()
            .map(|row| {
                running += row.weight;
                // Multiply before dividing so whole-number shares land exactly.
                (running * total as f64 / table.scale + FLOOR_EPSILON).floor() as usize
            })
            .collect()
    });
    if let Some(last) = ends.last_mut() {
        *last = total;
    }
    ends
}

/// Integer flooring, available when every weight is a whole number.
fn exact_ends(table: &ResolvedTable<'_>, total: usize) -> Option<Vec<usize>> {
    let weights = table
        .rows
        .iter()
        .map(|row| whole_weight(row.weight))
        .collect::<Option<Vec<u128>>>()?;
    let scale = weights.iter().try_fold(0u128, |sum, weight| sum.checked_add(*weight))?;
    if scale == 0 {
        return None;
    }
    let mut running = 0u128;
    weights
        .iter()
        .map(|weight| {
            running += weight;
            let end = running.checked_mul(total as u128)? / scale;
            usize::try_from(end).ok()
        })
        .collect()
}

fn whole_weight(weight: f64) -> Option<u128> {
    (weight.fract() == 0.0 && weight <= MAX_EXACT_WEIGHT).then_some(weight as u128)
}

struct ResolvedRow<'a> {
    generator: &'a ValueGenerator,
    weight: f64,
    is_default: bool,
}

struct ResolvedTable<'a> {
    rows: Vec<ResolvedRow<'a>>,
    scale: f64,
}

fn resolve_table<'a>(
    entries: &'a [WeightEntry],
    mode: WeightMode,
    default: Option<&'a ValueGenerator>,
) -> Result<ResolvedTable<'a>> {
    for (index, entry) in entries.iter().enumerate() {
        if !(entry.weight.is_finite() && entry.weight > 0.0) {
            return Err(GenerationError::InvalidWeight {
                index,
                weight: entry.weight,
            });
        }
    }

    let mut rows: Vec<ResolvedRow<'a>> = entries
        .iter()
        .map(|entry| ResolvedRow {
            generator: &entry.generator,
            weight: entry.weight,
            is_default: false,
        })
        .collect();
    let declared: f64 = rows.iter().map(|row| row.weight).sum();

    let scale = match mode {
        WeightMode::Percentage => {
            let mut sum = declared;
            if let Some(default) = default
                && declared < PERCENT_SCALE
            {
                rows.push(ResolvedRow {
                    generator: default,
                    weight: PERCENT_SCALE - declared,
                    is_default: true,
                });
                sum = PERCENT_SCALE;
            }
            if sum.round() != PERCENT_SCALE {
                return Err(GenerationError::InvalidDistribution(format!(
                    "percentages sum to {sum}, expected 100"
                )));
            }
            PERCENT_SCALE
        }
        WeightMode::Absolute => {
            if default.is_some() {
                return Err(GenerationError::InvalidDistribution(
                    "a default generator requires percentage mode".to_string(),
                ));
            }
            if rows.is_empty() {
                return Err(GenerationError::InvalidDistribution(
                    "weight table is empty".to_string(),
                ));
            }
            declared
        }
    };

    Ok(ResolvedTable { rows, scale })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(weights: &[f64]) -> Vec<WeightEntry> {
        weights
            .iter()
            .map(|weight| WeightEntry {
                generator: ValueGenerator::integer(),
                weight: *weight,
            })
            .collect()
    }

    #[test]
    fn offsets_are_contiguous() {
        let table = entries(&[10.0, 3.0, 7.0]);
        let plan = allocate(&table, 10, WeightMode::Absolute, None).expect("allocate");
        assert_eq!(plan.counts(), vec![5, 1, 4]);
        let mut expected_offset = 0;
        for bucket in &plan.buckets {
            assert_eq!(bucket.offset, expected_offset);
            expected_offset += bucket.count;
        }
        assert_eq!(expected_offset, 10);
        assert_eq!(plan.backend, Backend::Direct);
    }

    #[test]
    fn percentage_default_takes_remainder() {
        let table = entries(&[10.0, 25.0, 40.0]);
        let default = ValueGenerator::text();
        let plan = allocate(&table, 100, WeightMode::Percentage, Some(&default)).expect("allocate");
        assert_eq!(plan.counts(), vec![10, 25, 40, 25]);
        let last = plan.buckets.last().expect("default bucket");
        assert!(last.is_default);
        assert_eq!(last.weight, 25.0);
        assert_eq!(last.range(), 75..100);
    }

    #[test]
    fn percentages_off_by_rounding_are_accepted() {
        let table = entries(&[33.3, 33.3, 33.3]);
        let plan = allocate(&table, 3, WeightMode::Percentage, None).expect("99.9 rounds to 100");
        assert_eq!(plan.allocated(), 3);
    }

    #[test]
    fn huge_whole_weights_floor_exactly() {
        let table = entries(&[999_999_999_999.0, 1.0]);
        let plan = allocate(&table, 1, WeightMode::Absolute, None).expect("allocate");
        assert_eq!(plan.counts(), vec![0, 1]);
    }

    #[test]
    fn fractional_percentages_land_on_whole_boundaries() {
        let table = entries(&[10.1, 19.9, 70.0]);
        let plan = allocate(&table, 10, WeightMode::Percentage, None).expect("allocate");
        assert_eq!(plan.counts(), vec![1, 2, 7]);
    }

    #[test]
    fn small_totals_keep_zero_count_buckets() {
        let table = entries(&[1.0, 1.0, 1.0, 1.0]);
        let plan = allocate(&table, 2, WeightMode::Absolute, None).expect("allocate");
        assert_eq!(plan.counts(), vec![0, 1, 0, 1]);
        assert_eq!(plan.buckets.len(), 4);
    }

    #[test]
    fn rejects_bad_tables() {
        assert!(matches!(
            allocate(&entries(&[1.0, -2.0]), 5, WeightMode::Absolute, None),
            Err(GenerationError::InvalidWeight { index: 1, .. })
        ));
        assert!(matches!(
            allocate(&entries(&[f64::NAN]), 5, WeightMode::Absolute, None),
            Err(GenerationError::InvalidWeight { index: 0, .. })
        ));
        assert!(matches!(
            allocate(&entries(&[]), 5, WeightMode::Absolute, None),
            Err(GenerationError::InvalidDistribution(_))
        ));
        assert!(matches!(
            allocate(&entries(&[50.0]), 0, WeightMode::Percentage, None),
            Err(GenerationError::InvalidSampleSize(0))
        ));
        let default = ValueGenerator::text();
        assert!(matches!(
            allocate(&entries(&[3.0]), 5, WeightMode::Absolute, Some(&default)),
            Err(GenerationError::InvalidDistribution(_))
        ));
    }

    #[test]
    fn backend_follows_generator_kinds() {
        let constrained = ValueGenerator::constrained(1, 5).expect("bounds");
        let integer = ValueGenerator::integer();
        assert_eq!(
            select_backend([&constrained, &constrained]).expect("constraint"),
            Backend::Constraint
        );
        assert_eq!(select_backend([&integer]).expect("direct"), Backend::Direct);
        assert!(matches!(
            select_backend([&constrained, &integer]),
            Err(GenerationError::MixedBackendUnsupported)
        ));
    }
}
