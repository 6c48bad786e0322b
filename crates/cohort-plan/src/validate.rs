use std::collections::HashSet;

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::errors::{IssueSeverity, PlanError, ValidationIssue, ValidationReport};
use crate::model::{
    AttributeSpec, CompositeSpec, DatasetPlan, DistributionSpec, GeneratorSpec, PLAN_VERSION,
    TextSpec, WeightMode,
};
use crate::schema::plan_json_schema_value;

/// Validated plan with accumulated warnings.
#[derive(Debug, Clone)]
pub struct ValidatedPlan {
    pub plan: DatasetPlan,
    pub warnings: Vec<ValidationIssue>,
}

/// Validate a plan JSON document against the plan JSON Schema.
pub fn validate_plan_json(
    plan_json: &Value,
    plan_schema: &Value,
) -> Result<ValidationReport, PlanError> {
    let compiled =
        JSONSchema::compile(plan_schema).map_err(|err| PlanError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();

    if let Err(errors) = compiled.validate(plan_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "schema_violation",
                path,
                error.to_string(),
                None,
            ));
        }
    }

    Ok(report)
}

/// Structural checks over a parsed plan.
pub fn validate_plan(plan: &DatasetPlan) -> ValidationReport {
    let mut report = ValidationReport::default();

    if plan.plan_version != PLAN_VERSION {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "unsupported_plan_version",
            "/plan_version",
            format!(
                "plan_version '{}' is not supported (expected '{PLAN_VERSION}')",
                plan.plan_version
            ),
            Some(format!("set plan_version = \"{PLAN_VERSION}\"")),
        ));
    }

    if plan.name.trim().is_empty() {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "empty_name",
            "/name",
            "plan name must be a non-empty string",
            None,
        ));
    }

    if plan.records == 0 {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "records_zero",
            "/records",
            "records must be greater than zero",
            Some("set records to a positive integer".to_string()),
        ));
    }

    validate_attributes(&plan.attributes, "", &mut report);
    report
}

/// Validate a plan document end-to-end: JSON Schema first, then structure.
pub fn validate_plan_document(plan_json: &Value) -> Result<ValidatedPlan, ValidationReport> {
    let structural = plan_json_schema_value()
        .and_then(|schema| validate_plan_json(plan_json, &schema))
        .unwrap_or_else(|err| {
            single_error("schema_validation_error", "/", err.to_string())
        });
    if !structural.is_ok() {
        return Err(structural);
    }

    let plan: DatasetPlan = match serde_json::from_value(plan_json.clone()) {
        Ok(plan) => plan,
        Err(err) => return Err(single_error("invalid_plan_json", "/", err.to_string())),
    };

    let report = validate_plan(&plan);
    if !report.is_ok() {
        return Err(report);
    }

    Ok(ValidatedPlan {
        plan,
        warnings: report.warnings,
    })
}

fn single_error(code: &str, path: &str, message: String) -> ValidationReport {
    let mut report = ValidationReport::default();
    report.push_error(ValidationIssue::new(
        IssueSeverity::Error,
        code,
        path,
        message,
        None,
    ));
    report
}

fn validate_attributes(attributes: &[AttributeSpec], base_path: &str, report: &mut ValidationReport) {
    if attributes.is_empty() {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "attributes_empty",
            format!("{base_path}/attributes"),
            "an entity requires at least one attribute",
            Some("add at least one attribute".to_string()),
        ));
        return;
    }

    let mut seen = HashSet::new();
    for (idx, attribute) in attributes.iter().enumerate() {
        let path = format!("{base_path}/attributes/{idx}");
        if attribute.name.trim().is_empty() {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "empty_attribute_name",
                format!("{path}/name"),
                "attribute name must be a non-empty string",
                None,
            ));
        } else if !seen.insert(attribute.name.as_str()) {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "duplicate_attribute",
                format!("{path}/name"),
                format!("attribute '{}' is declared more than once", attribute.name),
                Some("rename or merge the duplicate attributes".to_string()),
            ));
        }
        validate_generator(&attribute.generator, &format!("{path}/generator"), report);
    }
}

fn validate_generator(spec: &GeneratorSpec, path: &str, report: &mut ValidationReport) {
    match spec {
        GeneratorSpec::Text(text) => validate_text(text, path, report),
        GeneratorSpec::FirstName(_) | GeneratorSpec::LastName(_) | GeneratorSpec::FullName(_) => {}
        GeneratorSpec::Integer(integer) => {
            if let (Some(min), Some(max)) = (integer.min, integer.max) {
                check_bounds(min, max, path, report);
            }
        }
        GeneratorSpec::ConstrainedInteger(constrained) => {
            check_bounds(constrained.min, constrained.max, path, report);
        }
        GeneratorSpec::Composite(composite) => validate_composite(composite, path, report),
        GeneratorSpec::Entity(entity) => validate_attributes(&entity.attributes, path, report),
        GeneratorSpec::Distribution(distribution) => {
            validate_distribution(distribution, path, report)
        }
    }
}

fn validate_text(text: &TextSpec, path: &str, report: &mut ValidationReport) {
    for (field, value) in [
        ("exactly", text.exactly),
        ("min_len", text.min_len),
        ("max_len", text.max_len),
    ] {
        if let Some(value) = value
            && value < 0
        {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "negative_length",
                format!("{path}/{field}"),
                format!("{field} must not be negative (got {value})"),
                None,
            ));
        }
    }

    if text.exactly.is_some() && (text.min_len.is_some() || text.max_len.is_some()) {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "conflicting_length",
            path.to_string(),
            "exactly cannot be combined with min_len/max_len",
            Some("use either exactly or a min_len/max_len range".to_string()),
        ));
    }

    if let (Some(min), Some(max)) = (text.min_len, text.max_len) {
        check_bounds(min, max, path, report);
    }
}

fn validate_composite(composite: &CompositeSpec, path: &str, report: &mut ValidationReport) {
    if composite.children.is_empty() {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "composite_empty",
            format!("{path}/children"),
            "a composite requires at least one child",
            None,
        ));
    }

    if composite.separator.is_none() {
        report.push_warning(ValidationIssue::new(
            IssueSeverity::Warning,
            "missing_separator",
            format!("{path}/separator"),
            "composite has no separator; generation will fail",
            Some("set separator (an empty string is allowed)".to_string()),
        ));
    }

    for (idx, child) in composite.children.iter().enumerate() {
        let child_path = format!("{path}/children/{idx}");
        if matches!(child, GeneratorSpec::Entity(_)) {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "invalid_composite_child",
                child_path.clone(),
                "entity generators produce records and cannot be joined",
                None,
            ));
        }
        validate_generator(child, &child_path, report);
    }
}

fn validate_distribution(
    distribution: &DistributionSpec,
    path: &str,
    report: &mut ValidationReport,
) {
    if distribution.entries.is_empty() && distribution.default.is_none() {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "distribution_empty",
            format!("{path}/entries"),
            "a distribution requires at least one entry",
            None,
        ));
    }

    let mut all_valid = true;
    for (idx, entry) in distribution.entries.iter().enumerate() {
        let entry_path = format!("{path}/entries/{idx}");
        if !(entry.weight.is_finite() && entry.weight > 0.0) {
            all_valid = false;
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "invalid_weight",
                format!("{entry_path}/weight"),
                format!("weight must be positive and finite (got {})", entry.weight),
                None,
            ));
        }
        validate_generator(&entry.generator, &format!("{entry_path}/generator"), report);
    }

    if let Some(default) = &distribution.default {
        validate_generator(default, &format!("{path}/default"), report);
    }

    match distribution.mode {
        WeightMode::Absolute => {
            if distribution.default.is_some() {
                report.push_error(ValidationIssue::new(
                    IssueSeverity::Error,
                    "default_in_absolute_mode",
                    format!("{path}/default"),
                    "a default generator is only meaningful for percentage tables",
                    Some("switch mode to \"percentage\" or give the default a weight".to_string()),
                ));
            }
        }
        WeightMode::Percentage if all_valid => {
            let total: f64 = distribution.entries.iter().map(|entry| entry.weight).sum();
            let filled = distribution.default.is_some() && total < 100.0;
            if !filled && total.round() != 100.0 {
                report.push_error(ValidationIssue::new(
                    IssueSeverity::Error,
                    "percentages_not_100",
                    format!("{path}/entries"),
                    format!("percentages sum to {total}, expected 100"),
                    Some("adjust the weights or add a default generator".to_string()),
                ));
            }
        }
        WeightMode::Percentage => {}
    }

    // The default only becomes a bucket when it has a remainder to fill.
    let declared: f64 = distribution.entries.iter().map(|entry| entry.weight).sum();
    let default_used = distribution.mode == WeightMode::Percentage && declared < 100.0;
    let generators: Vec<&GeneratorSpec> = distribution
        .entries
        .iter()
        .map(|entry| &entry.generator)
        .chain(distribution.default.as_deref().filter(|_| default_used))
        .collect();
    let constrained = generators
        .iter()
        .filter(|generator| generator.is_constrained())
        .count();
    if constrained > 0 && constrained < generators.len() {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "mixed_backend",
            path.to_string(),
            "constrained_integer entries cannot be mixed with other generators",
            Some("use only constrained_integer or only unconstrained generators".to_string()),
        ));
    }
}

fn check_bounds(min: i64, max: i64, path: &str, report: &mut ValidationReport) {
    if max < min {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "invalid_bounds",
            path.to_string(),
            format!("max ({max}) must be greater than or equal to min ({min})"),
            None,
        ));
    }
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}
