use cohort_core::CaseTransform;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Plan format version understood by this crate.
pub const PLAN_VERSION: &str = "1";

/// Canonical dataset plan.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DatasetPlan {
    /// Contract version for the plan format.
    pub plan_version: String,
    /// Entity name, used in logs and reports.
    pub name: String,
    /// Number of records to generate.
    pub records: u64,
    /// Seed for reproducibility. Absent means entropy seeding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Attributes of each generated record, in output order.
    pub attributes: Vec<AttributeSpec>,
}

/// A named attribute and the generator that fills it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AttributeSpec {
    pub name: String,
    pub generator: GeneratorSpec,
}

/// Generator union, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeneratorSpec {
    /// Random text from the fact provider.
    Text(TextSpec),
    FirstName(NameSpec),
    LastName(NameSpec),
    FullName(NameSpec),
    /// Integer drawn independently per value.
    Integer(IntegerSpec),
    /// Integer solved as one variable of a joint constraint model.
    ConstrainedInteger(ConstrainedIntegerSpec),
    /// Children joined by a separator.
    Composite(CompositeSpec),
    /// Nested record.
    Entity(EntitySpec),
    /// Weighted table of generators.
    Distribution(DistributionSpec),
}

impl GeneratorSpec {
    /// The `type` tag of this spec.
    pub fn kind_name(&self) -> &'static str {
        match self {
            GeneratorSpec::Text(_) => "text",
            GeneratorSpec::FirstName(_) => "first_name",
            GeneratorSpec::LastName(_) => "last_name",
            GeneratorSpec::FullName(_) => "full_name",
            GeneratorSpec::Integer(_) => "integer",
            GeneratorSpec::ConstrainedInteger(_) => "constrained_integer",
            GeneratorSpec::Composite(_) => "composite",
            GeneratorSpec::Entity(_) => "entity",
            GeneratorSpec::Distribution(_) => "distribution",
        }
    }

    pub fn is_constrained(&self) -> bool {
        matches!(self, GeneratorSpec::ConstrainedInteger(_))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TextSpec {
    /// Exact length in characters. Excludes `min_len`/`max_len`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exactly: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_len: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_len: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<CaseTransform>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NameSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<CaseTransform>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct IntegerSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConstrainedIntegerSpec {
    /// Inclusive lower bound.
    pub min: i64,
    /// Inclusive upper bound.
    pub max: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CompositeSpec {
    pub children: Vec<GeneratorSpec>,
    /// Required before generation; a missing separator is reported as a
    /// warning by validation and fails at generation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<CaseTransform>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EntitySpec {
    pub attributes: Vec<AttributeSpec>,
}

/// How the weights of a distribution are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WeightMode {
    /// Relative weights; shares are `w / Σw`.
    #[default]
    #[serde(alias = "weighted")]
    Absolute,
    /// Weights are percentages and must sum to 100.
    #[serde(alias = "percentages")]
    Percentage,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DistributionSpec {
    #[serde(default)]
    pub mode: WeightMode,
    #[serde(default)]
    pub entries: Vec<WeightEntrySpec>,
    /// Fills the remainder of a percentage table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Box<GeneratorSpec>>,
}

impl DistributionSpec {
    /// Entry generators followed by the default, if any.
    pub fn generators(&self) -> impl Iterator<Item = &GeneratorSpec> {
        self.entries
            .iter()
            .map(|entry| &entry.generator)
            .chain(self.default.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WeightEntrySpec {
    pub weight: f64,
    pub generator: GeneratorSpec,
}
