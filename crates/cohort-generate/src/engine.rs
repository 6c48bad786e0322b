use std::time::Instant;

use tracing::{info, warn};

use cohort_core::Record;
use cohort_plan::{DatasetPlan, validate_plan};

use crate::builder::build_entity;
use crate::constraint::{ConstraintEngine, SolverAdapter};
use crate::errors::{GenerationError, Result};
use crate::generators::GenerationContext;
use crate::model::{GenerateOptions, GenerationReport};
use crate::provider::{FactProvider, FakerProvider};

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub records: Vec<Record>,
    pub report: GenerationReport,
}

/// Entry point for generating a dataset from a plan.
#[derive(Debug, Clone, Default)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Seed used for a plan: the option seed, then the plan seed, then entropy.
    pub fn resolve_seed(&self, plan: &DatasetPlan) -> u64 {
        self.options
            .seed
            .or(plan.seed)
            .unwrap_or_else(rand::random)
    }

    /// Runs the plan with a seeded faker provider and solver adapter.
    pub fn run(&self, plan: &DatasetPlan) -> Result<GenerationResult> {
        let seed = self.resolve_seed(plan);
        let mut provider =
            FakerProvider::seeded(hash_seed(seed, "provider")).with_locale(self.options.locale);
        let solver = SolverAdapter::new(hash_seed(seed, "solver"))
            .with_time_limit(self.options.solver_time_limit)
            .with_value_order(self.options.value_order);
        self.run_with(plan, seed, &mut provider, &solver)
    }

    /// Runs the plan against caller-supplied collaborators.
    pub fn run_with(
        &self,
        plan: &DatasetPlan,
        seed: u64,
        provider: &mut dyn FactProvider,
        engine: &dyn ConstraintEngine,
    ) -> Result<GenerationResult> {
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let mut report = GenerationReport::new(run_id.clone(), plan.name.clone(), seed);

        let validation = validate_plan(plan);
        for issue in &validation.warnings {
            warn!(run_id = %run_id, code = %issue.code, path = %issue.path, "{}", issue.message);
            report.record_warning(issue.to_string());
        }
        if !validation.is_ok() {
            let details: Vec<String> = validation.errors.iter().map(ToString::to_string).collect();
            return Err(GenerationError::InvalidPlan(details.join("; ")));
        }

        let records = match self.options.records {
            Some(records) => records,
            None => usize::try_from(plan.records).map_err(|_| {
                GenerationError::InvalidPlan(format!("records {} is too large", plan.records))
            })?,
        };
        report.records_requested = records as u64;

        let entity = build_entity(plan)?;
        entity.validate()?;

        info!(
            run_id = %run_id,
            entity = %entity.name(),
            attributes = entity.len(),
            records,
            seed,
            "generation started"
        );

        let mut ctx = GenerationContext::new(provider, engine);
        let outcome = entity.generate_records(records, &mut ctx);
        report.record_stats(ctx.stats());
        report.duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(records) => {
                report.records_generated = records.len() as u64;
                info!(
                    run_id = %run_id,
                    records = report.records_generated,
                    provider_draws = report.provider_draws,
                    solver_calls = report.solver_calls,
                    duration_ms = report.duration_ms,
                    "generation completed"
                );
                Ok(GenerationResult { records, report })
            }
            Err(err) => {
                warn!(run_id = %run_id, error = %err, "generation failed");
                Err(err)
            }
        }
    }
}

fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
