use cohort_core::CaseTransform;
use cohort_plan::{DatasetPlan, GeneratorSpec, IntegerSpec, TextSpec};

use crate::errors::Result;
use crate::generators::{Distribution, EntityGenerator, ValueGenerator};
use crate::provider::{DEFAULT_INT_MAX, DEFAULT_INT_MIN, DEFAULT_TEXT_MAX, DEFAULT_TEXT_MIN};

/// Builds the top-level entity generator of a plan.
pub fn build_entity(plan: &DatasetPlan) -> Result<EntityGenerator> {
    let mut entity = EntityGenerator::named(plan.name.clone());
    for attribute in &plan.attributes {
        entity = entity.attribute(attribute.name.clone(), build_generator(&attribute.generator)?)?;
    }
    Ok(entity)
}

/// Maps one generator spec onto the builder surface.
pub fn build_generator(spec: &GeneratorSpec) -> Result<ValueGenerator> {
    match spec {
        GeneratorSpec::Text(text) => build_text(text),
        GeneratorSpec::FirstName(name) => with_transform(ValueGenerator::first_name(), name.transform),
        GeneratorSpec::LastName(name) => with_transform(ValueGenerator::last_name(), name.transform),
        GeneratorSpec::FullName(name) => with_transform(ValueGenerator::full_name(), name.transform),
        GeneratorSpec::Integer(integer) => build_integer(integer),
        GeneratorSpec::ConstrainedInteger(constrained) => {
            ValueGenerator::constrained(constrained.min, constrained.max)
        }
        GeneratorSpec::Composite(composite) => {
            let children = composite
                .children
                .iter()
                .map(build_generator)
                .collect::<Result<Vec<_>>>()?;
            let mut generator = ValueGenerator::composite(children);
            if let Some(separator) = &composite.separator {
                generator = generator.joined_by(separator.clone())?;
            }
            with_transform(generator, composite.transform)
        }
        GeneratorSpec::Entity(entity) => {
            let mut generator = EntityGenerator::new();
            for attribute in &entity.attributes {
                generator =
                    generator.attribute(attribute.name.clone(), build_generator(&attribute.generator)?)?;
            }
            Ok(generator.into())
        }
        GeneratorSpec::Distribution(spec) => {
            let mut distribution = Distribution::with_mode(spec.mode);
            for entry in &spec.entries {
                distribution = distribution.add(build_generator(&entry.generator)?, entry.weight);
            }
            if let Some(default) = &spec.default {
                distribution = distribution.with_default(build_generator(default)?);
            }
            Ok(distribution.into())
        }
    }
}

fn build_text(text: &TextSpec) -> Result<ValueGenerator> {
    let generator = ValueGenerator::text();
    let generator = match (text.exactly, text.min_len, text.max_len) {
        (Some(exactly), _, _) => generator.of_length(exactly, None)?,
        (None, Some(min), Some(max)) => generator.of_length(min, Some(max))?,
        (None, Some(min), None) => generator.of_length(min, Some(min.max(DEFAULT_TEXT_MAX)))?,
        (None, None, Some(max)) => generator.of_length(max.min(DEFAULT_TEXT_MIN), Some(max))?,
        (None, None, None) => generator,
    };
    with_transform(generator, text.transform)
}

fn build_integer(integer: &IntegerSpec) -> Result<ValueGenerator> {
    let generator = ValueGenerator::integer();
    match (integer.min, integer.max) {
        (Some(min), Some(max)) => generator.between(min, max),
        (Some(min), None) => generator.between(min, min.max(DEFAULT_INT_MAX)),
        (None, Some(max)) => generator.between(max.min(DEFAULT_INT_MIN), max),
        (None, None) => Ok(generator),
    }
}

fn with_transform(
    generator: ValueGenerator,
    transform: Option<CaseTransform>,
) -> Result<ValueGenerator> {
    match transform {
        Some(transform) => generator.transformed_as(transform),
        None => Ok(generator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GenerationError;
    use serde_json::json;

    fn spec(value: serde_json::Value) -> GeneratorSpec {
        serde_json::from_value(value).expect("generator spec")
    }

    #[test]
    fn text_bounds_map_onto_of_length() {
        let generator = build_generator(&spec(json!({
            "type": "text", "min_len": 2, "max_len": 15, "transform": "lower"
        })))
        .expect("text builds");
        let ValueGenerator::Primitive(primitive) = generator else {
            panic!("text should be primitive");
        };
        assert_eq!(primitive.options().at_least, Some(2));
        assert_eq!(primitive.options().at_most, Some(15));
        assert_eq!(primitive.transform(), CaseTransform::Lower);
    }

    #[test]
    fn inverted_bounds_propagate() {
        let result = build_generator(&spec(json!({ "type": "constrained_integer", "min": 9, "max": 1 })));
        assert!(matches!(
            result,
            Err(GenerationError::InvalidBounds { min: 9, max: 1 })
        ));
    }

    #[test]
    fn duplicate_nested_attributes_are_rejected() {
        let result = build_generator(&spec(json!({
            "type": "entity",
            "attributes": [
                { "name": "a", "generator": { "type": "integer" } },
                { "name": "a", "generator": { "type": "text" } }
            ]
        })));
        assert!(matches!(result, Err(GenerationError::InvalidOperation(_))));
    }

    #[test]
    fn distribution_keeps_entry_order() {
        let generator = build_generator(&spec(json!({
            "type": "distribution",
            "mode": "percentage",
            "entries": [
                { "weight": 60, "generator": { "type": "first_name" } },
                { "weight": 40, "generator": { "type": "last_name" } }
            ]
        })))
        .expect("distribution builds");
        let ValueGenerator::Distribution(distribution) = generator else {
            panic!("expected distribution");
        };
        let kinds: Vec<&str> = distribution
            .entries()
            .iter()
            .map(|entry| entry.generator.kind_name())
            .collect();
        assert_eq!(kinds, vec!["first_name", "last_name"]);
    }
}
