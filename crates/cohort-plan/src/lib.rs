//! Dataset plan contracts, loading and validation.
//!
//! A plan names an entity, a record count, an optional seed and the ordered
//! attributes of each record together with their generator specs. Plans are
//! authored in TOML or JSON and validated in two passes: against the emitted
//! JSON Schema, then structurally.

pub mod errors;
pub mod load;
pub mod model;
pub mod schema;
pub mod validate;

pub use errors::{IssueSeverity, PlanError, ValidationIssue, ValidationReport};
pub use load::{PlanFormat, load_plan, load_plan_value, parse_plan_value};
pub use model::{
    AttributeSpec, CompositeSpec, ConstrainedIntegerSpec, DatasetPlan, DistributionSpec,
    EntitySpec, GeneratorSpec, IntegerSpec, NameSpec, PLAN_VERSION, TextSpec, WeightEntrySpec,
    WeightMode,
};
pub use schema::{plan_json_schema, plan_json_schema_value};
pub use validate::{ValidatedPlan, validate_plan, validate_plan_document, validate_plan_json};
