use std::path::PathBuf;

use cohort_core::{GeneratedValue, Record};
use cohort_eval::{EvalError, ranges_from_spec, summarize_plan};
use cohort_plan::{DistributionSpec, GeneratorSpec, load_plan};

fn patients_age_spec() -> (cohort_plan::DatasetPlan, DistributionSpec) {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../plans/patients.plan.toml");
    let plan = load_plan(&path).expect("patients plan");
    let spec = plan
        .attributes
        .iter()
        .find_map(|attribute| match &attribute.generator {
            GeneratorSpec::Distribution(spec) if attribute.name == "age" => Some(spec.clone()),
            _ => None,
        })
        .expect("age distribution");
    (plan, spec)
}

#[test]
fn percentage_ranges_include_default_remainder() {
    let (_, spec) = patients_age_spec();
    let ranges = ranges_from_spec(&spec).expect("ranges");
    let shares: Vec<f64> = ranges.iter().map(|range| range.expected_share).collect();
    assert_eq!(ranges.len(), 4);
    for (share, expected) in shares.iter().zip([0.20, 0.25, 0.35, 0.20]) {
        assert!((share - expected).abs() < 1e-9);
    }
    assert_eq!((ranges[3].min, ranges[3].max), (60, 101));
}

#[test]
fn summarizes_only_numeric_distributions() {
    let (plan, _) = patients_age_spec();
    let ages = [5, 25, 45, 45, 70];
    let records: Vec<Record> = ages
        .iter()
        .map(|age| {
            let mut record = Record::new();
            record.push("name", GeneratedValue::Text("Ana".to_string()));
            record.push("age", GeneratedValue::Int(*age));
            record
        })
        .collect();

    let summaries = summarize_plan(&plan, &records);
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].attribute, "age");
    let observed: Vec<u64> = summaries[0]
        .summary
        .buckets
        .iter()
        .map(|bucket| bucket.observed)
        .collect();
    assert_eq!(observed, vec![1, 1, 2, 1]);
}

#[test]
fn text_tables_are_unsupported() {
    let spec: DistributionSpec = serde_json::from_value(serde_json::json!({
        "mode": "absolute",
        "entries": [{ "weight": 1, "generator": { "type": "text", "exactly": 2 } }]
    }))
    .expect("spec");
    assert!(matches!(
        ranges_from_spec(&spec),
        Err(EvalError::UnsupportedGenerator(_))
    ));
}
