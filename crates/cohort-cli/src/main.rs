mod logging;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;

use cohort_eval::{render_summary, summarize_plan};
use cohort_generate::{
    FakerLocale, GenerateOptions, GenerationEngine, GenerationError, SolverValueOrder,
};
use cohort_plan::{
    PlanError, ValidatedPlan, ValidationReport, load_plan_value, plan_json_schema,
    validate_plan_document,
};
use logging::init_logging;

#[derive(Debug, Error)]
enum CliError {
    #[error("plan error: {0}")]
    Plan(#[from] PlanError),
    #[error("plan has {0} validation error(s)")]
    InvalidPlan(usize),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("logging error: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(name = "cohort", version, about = "Weighted synthetic dataset generator")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate records as NDJSON on stdout.
    Generate(GenerateArgs),
    /// Check a plan and print its issues.
    Validate(ValidateArgs),
    /// Print the plan JSON Schema.
    Schema,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Plan file (.toml or .json).
    #[arg(long)]
    plan: PathBuf,
    /// Override the plan record count.
    #[arg(long)]
    records: Option<usize>,
    /// Override the plan seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Print observed vs expected bucket shares to stderr.
    #[arg(long, default_value_t = false)]
    summary: bool,
    /// Wall-clock limit for each solver call.
    #[arg(long, value_name = "MS")]
    solver_time_limit_ms: Option<u64>,
    /// Value order for constrained buckets.
    #[arg(long, value_enum, default_value_t = ValueOrderArg::Random)]
    value_order: ValueOrderArg,
    /// Locale for person names (en, pt_br).
    #[arg(long, default_value_t = FakerLocale::En)]
    locale: FakerLocale,
    /// Write the generation report as JSON to this file.
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Plan file (.toml or .json).
    #[arg(long)]
    plan: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ValueOrderArg {
    Min,
    Random,
}

impl From<ValueOrderArg> for SolverValueOrder {
    fn from(value: ValueOrderArg) -> Self {
        match value {
            ValueOrderArg::Min => SolverValueOrder::Min,
            ValueOrderArg::Random => SolverValueOrder::Random,
        }
    }
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_json).map_err(CliError::Logging)?;

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Validate(args) => run_validate(args),
        Command::Schema => run_schema(),
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let validated = load_validated(&args.plan)?;

    let options = GenerateOptions {
        seed: args.seed,
        records: args.records,
        solver_time_limit: args.solver_time_limit_ms.map(Duration::from_millis),
        value_order: args.value_order.into(),
        locale: args.locale,
    };
    let engine = GenerationEngine::new(options);
    let result = engine.run(&validated.plan)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for record in &result.records {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    if args.summary {
        let summaries = summarize_plan(&validated.plan, &result.records);
        eprintln!("{}", render_summary(&summaries));
    }

    if let Some(path) = args.report {
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, &result.report)?;
        writer.flush()?;
        tracing::info!(path = %path.display(), "report written");
    }
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), CliError> {
    let validated = load_validated(&args.plan)?;
    println!(
        "{} is valid ({} attribute(s), {} warning(s))",
        args.plan.display(),
        validated.plan.attributes.len(),
        validated.warnings.len()
    );
    Ok(())
}

fn run_schema() -> Result<(), CliError> {
    let schema = plan_json_schema();
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

/// Loads a plan and prints every issue; errors abort with a non-zero exit.
fn load_validated(path: &Path) -> Result<ValidatedPlan, CliError> {
    let value = load_plan_value(path)?;
    match validate_plan_document(&value) {
        Ok(validated) => {
            for issue in &validated.warnings {
                eprintln!("{issue}");
            }
            Ok(validated)
        }
        Err(report) => {
            print_report(&report);
            Err(CliError::InvalidPlan(report.errors.len()))
        }
    }
}

fn print_report(report: &ValidationReport) {
    for issue in report.issues() {
        eprintln!("{issue}");
    }
}
