use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::errors::{PlanError, Result};
use crate::model::DatasetPlan;

/// On-disk plan encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFormat {
    Json,
    Toml,
}

impl PlanFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("json") => Ok(PlanFormat::Json),
            Some("toml") => Ok(PlanFormat::Toml),
            _ => Err(PlanError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Parses plan text into a JSON document without interpreting it.
pub fn parse_plan_value(contents: &str, format: PlanFormat) -> Result<Value> {
    match format {
        PlanFormat::Json => Ok(serde_json::from_str(contents)?),
        PlanFormat::Toml => Ok(toml::from_str(contents)?),
    }
}

/// Reads a plan file as a JSON document.
pub fn load_plan_value(path: &Path) -> Result<Value> {
    let format = PlanFormat::from_path(path)?;
    let contents = fs::read_to_string(path)?;
    parse_plan_value(&contents, format)
}

/// Reads and deserializes a plan file.
pub fn load_plan(path: &Path) -> Result<DatasetPlan> {
    let value = load_plan_value(path)?;
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            PlanFormat::from_path(Path::new("plans/a.plan.toml")).expect("toml"),
            PlanFormat::Toml
        );
        assert_eq!(
            PlanFormat::from_path(Path::new("A.JSON")).expect("json"),
            PlanFormat::Json
        );
        assert!(matches!(
            PlanFormat::from_path(Path::new("plan.yaml")),
            Err(PlanError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn toml_and_json_parse_to_the_same_plan() {
        let toml_text = r#"
plan_version = "1"
name = "patients"
records = 10

[[attributes]]
name = "age"
generator = { type = "integer", min = 1, max = 100 }
"#;
        let json_text = r#"{
  "plan_version": "1",
  "name": "patients",
  "records": 10,
  "attributes": [
    { "name": "age", "generator": { "type": "integer", "min": 1, "max": 100 } }
  ]
}"#;
        let from_toml = parse_plan_value(toml_text, PlanFormat::Toml).expect("toml parses");
        let from_json = parse_plan_value(json_text, PlanFormat::Json).expect("json parses");
        assert_eq!(from_toml, from_json);

        let plan: DatasetPlan = serde_json::from_value(from_toml).expect("plan model");
        assert_eq!(plan.records, 10);
        assert_eq!(plan.attributes[0].generator.kind_name(), "integer");
    }
}
