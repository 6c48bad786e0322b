//! Value generators and the context they draw from.
//!
//! Generators are plain values built with consuming builder methods and are
//! never mutated while generating. Every `generate(n)` call either returns
//! exactly `n` values or fails without a partial result.

mod composite;
mod constrained;
mod distribution;
mod entity;
mod primitive;

use serde::Serialize;

use cohort_core::{CaseTransform, FactKind, FactOptions, GeneratedValue};

use crate::constraint::{ConstraintEngine, ConstraintModel};
use crate::errors::{GenerationError, Result};
use crate::provider::FactProvider;

pub use composite::CompositeGenerator;
pub use constrained::ConstrainedNumeric;
pub(crate) use constrained::solve_ranges;
pub use distribution::Distribution;
pub use entity::EntityGenerator;
pub use primitive::PrimitiveGenerator;

/// Counters accumulated over one generation context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenerationStats {
    pub provider_draws: u64,
    pub solver_calls: u64,
    pub solver_nodes: u64,
    pub allocations: u64,
}

/// Collaborators shared by every generator in one run.
pub struct GenerationContext<'a> {
    provider: &'a mut dyn FactProvider,
    engine: &'a dyn ConstraintEngine,
    stats: GenerationStats,
}

impl<'a> GenerationContext<'a> {
    pub fn new(provider: &'a mut dyn FactProvider, engine: &'a dyn ConstraintEngine) -> Self {
        Self {
            provider,
            engine,
            stats: GenerationStats::default(),
        }
    }

    pub fn stats(&self) -> GenerationStats {
        self.stats
    }

    pub(crate) fn draw(&mut self, kind: FactKind, options: &FactOptions) -> GeneratedValue {
        self.stats.provider_draws += 1;
        self.provider.draw(kind, options)
    }

    pub(crate) fn new_model(&self, name: &str) -> Box<dyn ConstraintModel + 'a> {
        let engine = self.engine;
        engine.new_model(name)
    }

    pub(crate) fn record_solve(&mut self, nodes: u64) {
        self.stats.solver_calls += 1;
        self.stats.solver_nodes += nodes;
    }

    pub(crate) fn record_allocation(&mut self) {
        self.stats.allocations += 1;
    }
}

/// A source of generated values.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueGenerator {
    Primitive(PrimitiveGenerator),
    Composite(CompositeGenerator),
    ConstrainedNumeric(ConstrainedNumeric),
    Entity(EntityGenerator),
    Distribution(Distribution),
}

impl ValueGenerator {
    pub fn text() -> Self {
        ValueGenerator::Primitive(PrimitiveGenerator::new(FactKind::Text))
    }

    pub fn first_name() -> Self {
        ValueGenerator::Primitive(PrimitiveGenerator::new(FactKind::FirstName))
    }

    pub fn last_name() -> Self {
        ValueGenerator::Primitive(PrimitiveGenerator::new(FactKind::LastName))
    }

    pub fn full_name() -> Self {
        ValueGenerator::Primitive(PrimitiveGenerator::new(FactKind::FullName))
    }

    pub fn integer() -> Self {
        ValueGenerator::Primitive(PrimitiveGenerator::new(FactKind::Integer))
    }

    /// Integer solved jointly with its siblings, bounded to `[min, max]`.
    pub fn constrained(min: i64, max: i64) -> Result<Self> {
        Ok(ValueGenerator::ConstrainedNumeric(ConstrainedNumeric::new(
            min, max,
        )?))
    }

    /// Composite over `children`; call [`joined_by`](Self::joined_by)
    /// before generating.
    pub fn composite(children: Vec<ValueGenerator>) -> Self {
        ValueGenerator::Composite(CompositeGenerator::new(children))
    }

    pub fn entity() -> Self {
        ValueGenerator::Entity(EntityGenerator::new())
    }

    /// Fixes text length to `len`, or to `len..=upper` when `upper` is set.
    pub fn of_length(self, len: i64, upper: Option<i64>) -> Result<Self> {
        match self {
            ValueGenerator::Primitive(primitive) if primitive.kind() == FactKind::Text => {
                Ok(ValueGenerator::Primitive(primitive.of_length(len, upper)?))
            }
            other => Err(unsupported("of_length", &other)),
        }
    }

    /// Inclusive numeric bounds for integer and constrained generators.
    pub fn between(self, min: i64, max: i64) -> Result<Self> {
        match self {
            ValueGenerator::Primitive(primitive) if primitive.kind() == FactKind::Integer => {
                Ok(ValueGenerator::Primitive(primitive.between(min, max)?))
            }
            ValueGenerator::ConstrainedNumeric(_) => Self::constrained(min, max),
            other => Err(unsupported("between", &other)),
        }
    }

    pub fn joined_by(self, separator: impl Into<String>) -> Result<Self> {
        match self {
            ValueGenerator::Composite(composite) => {
                Ok(ValueGenerator::Composite(composite.joined_by(separator)))
            }
            other => Err(unsupported("joined_by", &other)),
        }
    }

    /// Replaces the children of a composite.
    pub fn from(self, children: Vec<ValueGenerator>) -> Result<Self> {
        match self {
            ValueGenerator::Composite(composite) => {
                Ok(ValueGenerator::Composite(composite.from(children)))
            }
            other => Err(unsupported("from", &other)),
        }
    }

    pub fn transformed_as(self, transform: CaseTransform) -> Result<Self> {
        match self {
            ValueGenerator::Primitive(primitive) if primitive.kind().is_textual() => {
                Ok(ValueGenerator::Primitive(primitive.transformed_as(transform)))
            }
            ValueGenerator::Composite(composite) => {
                Ok(ValueGenerator::Composite(composite.transformed_as(transform)))
            }
            other => Err(unsupported("transformed_as", &other)),
        }
    }

    /// Adds a named attribute to an entity generator.
    pub fn attribute(self, name: impl Into<String>, generator: ValueGenerator) -> Result<Self> {
        match self {
            ValueGenerator::Entity(entity) => {
                Ok(ValueGenerator::Entity(entity.attribute(name, generator)?))
            }
            other => Err(unsupported("attribute", &other)),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ValueGenerator::Primitive(primitive) => primitive.kind().as_str(),
            ValueGenerator::Composite(_) => "composite",
            ValueGenerator::ConstrainedNumeric(_) => "constrained_integer",
            ValueGenerator::Entity(_) => "entity",
            ValueGenerator::Distribution(_) => "distribution",
        }
    }

    pub fn is_constrained(&self) -> bool {
        matches!(self, ValueGenerator::ConstrainedNumeric(_))
    }

    pub fn as_constrained(&self) -> Option<&ConstrainedNumeric> {
        match self {
            ValueGenerator::ConstrainedNumeric(constrained) => Some(constrained),
            _ => None,
        }
    }

    /// Checks the whole generator tree before any generation work.
    pub fn validate(&self) -> Result<()> {
        match self {
            ValueGenerator::Primitive(primitive) => primitive.validate(),
            ValueGenerator::Composite(composite) => composite.validate(),
            ValueGenerator::ConstrainedNumeric(constrained) => constrained.validate(),
            ValueGenerator::Entity(entity) => entity.validate(),
            ValueGenerator::Distribution(distribution) => distribution.validate(),
        }
    }

    /// Generates exactly `n` values. The whole tree is validated before the
    /// first provider draw or solver call.
    pub fn generate(&self, n: usize, ctx: &mut GenerationContext<'_>) -> Result<Vec<GeneratedValue>> {
        if n < 1 {
            return Err(GenerationError::InvalidSampleSize(n));
        }
        self.validate()?;
        let values = match self {
            ValueGenerator::Primitive(primitive) => primitive.generate(n, ctx),
            ValueGenerator::Composite(composite) => composite.generate(n, ctx)?,
            ValueGenerator::ConstrainedNumeric(constrained) => constrained.generate(n, ctx)?,
            ValueGenerator::Entity(entity) => entity
                .generate_records(n, ctx)?
                .into_iter()
                .map(GeneratedValue::Record)
                .collect(),
            ValueGenerator::Distribution(distribution) => distribution.generate(n, ctx)?,
        };
        ensure_len(self, n, values)
    }
}

impl From<Distribution> for ValueGenerator {
    fn from(distribution: Distribution) -> Self {
        ValueGenerator::Distribution(distribution)
    }
}

impl From<EntityGenerator> for ValueGenerator {
    fn from(entity: EntityGenerator) -> Self {
        ValueGenerator::Entity(entity)
    }
}

fn ensure_len(
    generator: &ValueGenerator,
    n: usize,
    values: Vec<GeneratedValue>,
) -> Result<Vec<GeneratedValue>> {
    if values.len() == n {
        Ok(values)
    } else {
        Err(GenerationError::InvalidOperation(format!(
            "{} generator returned {} values, expected {n}",
            generator.kind_name(),
            values.len()
        )))
    }
}

fn unsupported(method: &str, generator: &ValueGenerator) -> GenerationError {
    GenerationError::InvalidOperation(format!(
        "{method} cannot be used with {} generators",
        generator.kind_name()
    ))
}
