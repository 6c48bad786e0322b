use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::constraint::SolverValueOrder;
use crate::generators::GenerationStats;
use crate::provider::FakerLocale;

/// Options for the generation engine.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Overrides the plan seed. Absent both, the run is seeded from entropy.
    pub seed: Option<u64>,
    /// Overrides the plan record count.
    pub records: Option<usize>,
    /// Wall-clock budget for each solver call.
    pub solver_time_limit: Option<Duration>,
    /// Value order used by the constraint backend.
    pub value_order: SolverValueOrder,
    /// Locale for person names.
    pub locale: FakerLocale,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            seed: None,
            records: None,
            solver_time_limit: None,
            value_order: SolverValueOrder::Random,
            locale: FakerLocale::En,
        }
    }
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub entity: String,
    pub seed: u64,
    pub started_at: DateTime<Utc>,
    pub records_requested: u64,
    pub records_generated: u64,
    pub provider_draws: u64,
    pub solver_calls: u64,
    pub solver_nodes: u64,
    pub allocations: u64,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl GenerationReport {
    pub fn new(run_id: String, entity: String, seed: u64) -> Self {
        Self {
            run_id,
            entity,
            seed,
            started_at: Utc::now(),
            records_requested: 0,
            records_generated: 0,
            provider_draws: 0,
            solver_calls: 0,
            solver_nodes: 0,
            allocations: 0,
            duration_ms: 0,
            warnings: Vec::new(),
        }
    }

    pub fn record_stats(&mut self, stats: GenerationStats) {
        self.provider_draws += stats.provider_draws;
        self.solver_calls += stats.solver_calls;
        self.solver_nodes += stats.solver_nodes;
        self.allocations += stats.allocations;
    }

    pub fn record_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}
