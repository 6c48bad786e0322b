use serde::Serialize;

use cohort_core::{GeneratedValue, Record};
use cohort_plan::{DatasetPlan, DistributionSpec, GeneratorSpec, WeightMode};

use crate::errors::{EvalError, Result};

/// Half-open integer range `[min, max)` with the share it should receive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketRange {
    pub label: String,
    pub min: i64,
    pub max: i64,
    /// Expected fraction of the sample in `0.0..=1.0`.
    pub expected_share: f64,
}

impl BucketRange {
    pub fn new(label: impl Into<String>, min: i64, max: i64, expected_share: f64) -> Self {
        Self {
            label: label.into(),
            min,
            max,
            expected_share,
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value < self.max
    }
}

/// Observed against expected counts for one range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSummary {
    pub label: String,
    pub min: i64,
    pub max: i64,
    pub observed: u64,
    pub observed_pct: f64,
    pub expected: f64,
    pub expected_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSummary {
    pub total: u64,
    pub buckets: Vec<BucketSummary>,
    /// Values that are not integers or fall in no range.
    pub unmatched: u64,
}

impl DistributionSummary {
    /// Largest gap between observed and expected counts, in values.
    pub fn max_deviation(&self) -> f64 {
        self.buckets
            .iter()
            .map(|bucket| (bucket.observed as f64 - bucket.expected).abs())
            .fold(0.0, f64::max)
    }
}

/// Summary for one top-level attribute of a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeSummary {
    pub attribute: String,
    pub summary: DistributionSummary,
}

/// Counts each integer value against the first range containing it.
pub fn summarize(values: &[GeneratedValue], ranges: &[BucketRange]) -> Result<DistributionSummary> {
    for range in ranges {
        if range.max <= range.min {
            return Err(EvalError::InvalidRange {
                label: range.label.clone(),
                reason: format!("max {} must be above min {}", range.max, range.min),
            });
        }
        if !(0.0..=1.0).contains(&range.expected_share) {
            return Err(EvalError::InvalidRange {
                label: range.label.clone(),
                reason: format!("expected share {} is outside 0..=1", range.expected_share),
            });
        }
    }

    let mut observed = vec![0u64; ranges.len()];
    let mut unmatched = 0;
    for value in values {
        let slot = value
            .as_i64()
            .and_then(|value| ranges.iter().position(|range| range.contains(value)));
        match slot {
            Some(idx) => observed[idx] += 1,
            None => unmatched += 1,
        }
    }

    let total = values.len() as u64;
    let buckets = ranges
        .iter()
        .zip(observed)
        .map(|(range, observed)| BucketSummary {
            label: range.label.clone(),
            min: range.min,
            max: range.max,
            observed,
            observed_pct: percent(observed as f64, total),
            expected: range.expected_share * total as f64,
            expected_pct: range.expected_share * 100.0,
        })
        .collect();

    Ok(DistributionSummary {
        total,
        buckets,
        unmatched,
    })
}

/// Derives ranges from a table whose generators are all bounded integers.
///
/// A percentage default receives whatever share the entries leave over.
pub fn ranges_from_spec(spec: &DistributionSpec) -> Result<Vec<BucketRange>> {
    let declared: f64 = spec.entries.iter().map(|entry| entry.weight).sum();
    let mut ranges = Vec::with_capacity(spec.entries.len() + 1);

    for entry in &spec.entries {
        let share = match spec.mode {
            WeightMode::Absolute if declared > 0.0 => entry.weight / declared,
            WeightMode::Absolute => 0.0,
            WeightMode::Percentage => entry.weight / 100.0,
        };
        ranges.push(numeric_range(&entry.generator, share)?);
    }

    if let Some(default) = spec.default.as_deref()
        && spec.mode == WeightMode::Percentage
    {
        let share = ((100.0 - declared) / 100.0).max(0.0);
        ranges.push(numeric_range(default, share)?);
    }
    Ok(ranges)
}

/// Summaries for every top-level numeric distribution attribute.
///
/// Attributes whose tables hold non-numeric generators are skipped.
pub fn summarize_plan(plan: &DatasetPlan, records: &[Record]) -> Vec<AttributeSummary> {
    plan.attributes
        .iter()
        .filter_map(|attribute| {
            let GeneratorSpec::Distribution(spec) = &attribute.generator else {
                return None;
            };
            let ranges = ranges_from_spec(spec).ok()?;
            let values: Vec<GeneratedValue> = records
                .iter()
                .filter_map(|record| record.get(&attribute.name).cloned())
                .collect();
            let summary = summarize(&values, &ranges).ok()?;
            Some(AttributeSummary {
                attribute: attribute.name.clone(),
                summary,
            })
        })
        .collect()
}

fn numeric_range(spec: &GeneratorSpec, share: f64) -> Result<BucketRange> {
    let (min, max) = match spec {
        GeneratorSpec::ConstrainedInteger(bounds) => (bounds.min, bounds.max),
        GeneratorSpec::Integer(bounds) => match (bounds.min, bounds.max) {
            (Some(min), Some(max)) => (min, max),
            _ => {
                return Err(EvalError::InvalidRange {
                    label: "integer".to_string(),
                    reason: "both bounds are required".to_string(),
                });
            }
        },
        other => return Err(EvalError::UnsupportedGenerator(other.kind_name().to_string())),
    };
    Ok(BucketRange::new(
        format!("{min}..={max}"),
        min,
        max.saturating_add(1),
        share,
    ))
}

fn percent(part: f64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part * 100.0 / total as f64
    }
}
