//! Command-line driver for the pursuit simulation engines.
//!
//! Runs single engine invocations and the two stock comparisons
//! (fixed vs arbitrary precision, continuous vs unit-step rules), logging
//! summaries and optionally writing plot-ready JSON artifacts.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use pursuit_core::{
    DecimalBackend, Float64Backend, PursuitEngine, Quantization, RunHistory, RunOutcome,
    SimulationConfig, history_to_f64, precision_divergence, rule_divergence,
};

#[derive(Parser, Debug)]
#[command(
    name = "pursuit",
    version,
    about = "Simulate a hunter/rabbit pursuit and compare precision and rule variants"
)]
struct Cli {
    /// Scaling coefficient `a` for the next cycle's step length.
    #[arg(long, short = 'a', default_value_t = 2.0, global = true)]
    scaling: f64,

    /// Distance threshold at which a run stops.
    #[arg(long, default_value_t = 100.0, global = true)]
    distance_limit: f64,

    /// Safety bound on cycle count.
    #[arg(long, default_value_t = u64::MAX, global = true)]
    max_cycles: u64,

    /// Decimal digits for arbitrary-precision runs.
    #[arg(long, default_value_t = DecimalBackend::DEFAULT_DIGITS, global = true)]
    digits: u32,

    /// Write the result as JSON to this path.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a single engine and report the escape summary.
    Run {
        /// Arithmetic backend to run on.
        #[arg(long, value_enum, default_value_t = BackendChoice::Decimal)]
        backend: BackendChoice,
        /// Step-length rule.
        #[arg(long, value_enum, default_value_t = RuleChoice::Continuous)]
        rule: RuleChoice,
    },
    /// Diff the continuous-rule recurrence at fixed vs arbitrary precision.
    ComparePrecision,
    /// Diff the continuous vs unit-step rules at arbitrary precision.
    CompareRules,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum BackendChoice {
    Float,
    Decimal,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum RuleChoice {
    Continuous,
    Unit,
}

impl From<RuleChoice> for Quantization {
    fn from(rule: RuleChoice) -> Self {
        match rule {
            RuleChoice::Continuous => Quantization::Continuous,
            RuleChoice::Unit => Quantization::UnitCeiling,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = SimulationConfig {
        scaling: cli.scaling,
        distance_limit: cli.distance_limit,
        max_cycles: cli.max_cycles,
        quantization: Quantization::Continuous,
    };

    match cli.command {
        Command::Run { backend, rule } => {
            let config = SimulationConfig {
                quantization: rule.into(),
                ..config
            };
            let history = run_single(backend, &config, cli.digits)?;
            log_summary("run", &history);
            write_artifact(cli.out.as_deref(), &history)?;
        }
        Command::ComparePrecision => {
            let result = precision_divergence(&config, cli.digits)
                .context("precision comparison failed")?;
            log_summary("float", &result.float_history);
            log_summary("decimal", &result.decimal_history);
            let max_drift = result
                .report
                .distance_diff
                .iter()
                .copied()
                .fold(0.0_f64, f64::max);
            info!(
                compared = result.report.compared,
                max_distance_drift = max_drift,
                "precision comparison complete"
            );
            write_artifact(cli.out.as_deref(), &result)?;
        }
        Command::CompareRules => {
            let result =
                rule_divergence(&config, cli.digits).context("rule comparison failed")?;
            log_summary("continuous", &result.continuous);
            log_summary("unit", &result.unit);
            write_artifact(cli.out.as_deref(), &result)?;
        }
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn run_single(
    backend: BackendChoice,
    config: &SimulationConfig,
    digits: u32,
) -> Result<RunHistory<f64>> {
    let history = match backend {
        BackendChoice::Float => {
            let backend = Float64Backend;
            PursuitEngine::new(&backend, config.clone())?.run()?
        }
        BackendChoice::Decimal => {
            let backend = DecimalBackend::new(digits)?;
            let history = PursuitEngine::new(&backend, config.clone())?.run()?;
            history_to_f64(&backend, &history)
        }
    };
    Ok(history)
}

fn log_summary(label: &str, history: &RunHistory<f64>) {
    let final_distance = history.distances.last().copied().unwrap_or(0.0);
    let truncated = history.outcome == RunOutcome::MaxCyclesReached;
    info!(
        label,
        cycles = history.cycles,
        final_distance,
        total_traveled = history.total_traveled,
        truncated,
        "run finished"
    );
}

fn write_artifact<T: Serialize>(path: Option<&Path>, value: &T) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("creating output file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("writing JSON to {}", path.display()))?;
    info!(path = %path.display(), "wrote JSON artifact");
    Ok(())
}
