use std::path::Path;

use cohort_plan::{
    DatasetPlan, GeneratorSpec, IssueSeverity, WeightMode, load_plan, load_plan_value,
    validate_plan, validate_plan_document,
};
use serde_json::json;

fn plan_path(file: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../plans")
        .join(file)
}

fn plan_from(value: serde_json::Value) -> DatasetPlan {
    serde_json::from_value(value).expect("plan model")
}

fn single_attribute(generator: serde_json::Value) -> serde_json::Value {
    json!({
        "plan_version": "1",
        "name": "patient",
        "records": 10,
        "attributes": [{ "name": "value", "generator": generator }]
    })
}

#[test]
fn bundled_plans_validate() {
    for file in ["patients.plan.toml", "regions.plan.json"] {
        let value = load_plan_value(&plan_path(file)).expect("plan loads");
        let validated = match validate_plan_document(&value) {
            Ok(validated) => validated,
            Err(report) => panic!("{file} failed validation: {:?}", report.errors),
        };
        assert!(validated.warnings.is_empty(), "unexpected warnings in {file}");
    }
}

#[test]
fn patients_plan_reads_percentage_table() {
    let plan = load_plan(&plan_path("patients.plan.toml")).expect("plan loads");
    assert_eq!(plan.records, 500);
    assert_eq!(plan.seed, Some(20240101));

    let age = plan
        .attributes
        .iter()
        .find(|attribute| attribute.name == "age")
        .expect("age attribute");
    let GeneratorSpec::Distribution(distribution) = &age.generator else {
        panic!("age should be a distribution");
    };
    assert_eq!(distribution.mode, WeightMode::Percentage);
    assert_eq!(distribution.entries.len(), 3);
    assert!(distribution.generators().all(GeneratorSpec::is_constrained));
}

#[test]
fn schema_rejects_unknown_generator_type() {
    let value = single_attribute(json!({ "type": "uuid" }));
    let report = validate_plan_document(&value).expect_err("unknown type rejected");
    assert!(report.has_code("schema_violation"));
}

#[test]
fn structural_issues_carry_paths() {
    let plan = plan_from(json!({
        "plan_version": "1",
        "name": "patient",
        "records": 0,
        "attributes": [
            { "name": "age", "generator": { "type": "integer", "min": 10, "max": 1 } },
            { "name": "age", "generator": {
                "type": "distribution",
                "mode": "absolute",
                "entries": [
                    { "weight": 1, "generator": { "type": "first_name" } },
                    { "weight": 0, "generator": { "type": "last_name" } }
                ]
            } }
        ]
    }));

    let report = validate_plan(&plan);
    let paths: Vec<(&str, &str)> = report
        .errors
        .iter()
        .map(|issue| (issue.code.as_str(), issue.path.as_str()))
        .collect();
    assert!(paths.contains(&("records_zero", "/records")));
    assert!(paths.contains(&("invalid_bounds", "/attributes/0/generator")));
    assert!(paths.contains(&("duplicate_attribute", "/attributes/1/name")));
    assert!(paths.contains(&(
        "invalid_weight",
        "/attributes/1/generator/entries/1/weight"
    )));
}

#[test]
fn percentages_must_reach_100() {
    let entries = json!([
        { "weight": 10, "generator": { "type": "constrained_integer", "min": 1, "max": 9 } },
        { "weight": 25, "generator": { "type": "constrained_integer", "min": 10, "max": 19 } },
        { "weight": 40, "generator": { "type": "constrained_integer", "min": 20, "max": 29 } }
    ]);

    let without_default = plan_from(single_attribute(json!({
        "type": "distribution",
        "mode": "percentage",
        "entries": entries.clone()
    })));
    assert!(validate_plan(&without_default).has_code("percentages_not_100"));

    let with_default = plan_from(single_attribute(json!({
        "type": "distribution",
        "mode": "percentage",
        "entries": entries,
        "default": { "type": "constrained_integer", "min": 30, "max": 39 }
    })));
    assert!(validate_plan(&with_default).is_ok());
}

#[test]
fn mixed_backends_and_absolute_defaults_are_errors() {
    let plan = plan_from(single_attribute(json!({
        "type": "distribution",
        "mode": "absolute",
        "entries": [
            { "weight": 1, "generator": { "type": "constrained_integer", "min": 1, "max": 9 } },
            { "weight": 1, "generator": { "type": "integer", "min": 1, "max": 9 } }
        ],
        "default": { "type": "integer" }
    })));

    let report = validate_plan(&plan);
    assert!(report.has_code("mixed_backend"));
    assert!(report.has_code("default_in_absolute_mode"));
}

#[test]
fn unused_default_does_not_mix_backends() {
    let entries = json!([
        { "weight": 60, "generator": { "type": "constrained_integer", "min": 1, "max": 9 } },
        { "weight": 40, "generator": { "type": "constrained_integer", "min": 10, "max": 19 } }
    ]);

    let full = plan_from(single_attribute(json!({
        "type": "distribution",
        "mode": "percentage",
        "entries": entries,
        "default": { "type": "integer", "min": 1, "max": 5 }
    })));
    assert!(validate_plan(&full).is_ok());

    let partial = plan_from(single_attribute(json!({
        "type": "distribution",
        "mode": "percentage",
        "entries": [
            { "weight": 60, "generator": { "type": "constrained_integer", "min": 1, "max": 9 } }
        ],
        "default": { "type": "integer", "min": 1, "max": 5 }
    })));
    assert!(validate_plan(&partial).has_code("mixed_backend"));
}

#[test]
fn composite_without_separator_is_a_warning() {
    let plan = plan_from(single_attribute(json!({
        "type": "composite",
        "children": [{ "type": "first_name" }, { "type": "last_name" }]
    })));

    let report = validate_plan(&plan);
    assert!(report.is_ok());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].severity, IssueSeverity::Warning);
    assert_eq!(report.warnings[0].code, "missing_separator");
    assert_eq!(report.warnings[0].path, "/attributes/0/generator/separator");
}

#[test]
fn text_lengths_are_checked() {
    let plan = plan_from(single_attribute(json!({
        "type": "text",
        "exactly": 4,
        "min_len": -1
    })));

    let report = validate_plan(&plan);
    assert!(report.has_code("negative_length"));
    assert!(report.has_code("conflicting_length"));
}
