//! Comparison drivers: diff two run histories cycle by cycle.
//!
//! The fixed-precision engine is expected to drift away from the
//! arbitrary-precision one; quantifying that drift is the point of these
//! drivers, so differences are computed in the high-precision arithmetic
//! (after lifting the `f64` history exactly) and only lowered to `f64` for
//! reporting. Runs terminate independently, so differing history lengths are
//! expected and reported, not treated as an error.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::arith::{ArithBackend, DecimalBackend, Float64Backend};
use crate::{
    EngineError, PlanePoint, PursuitEngine, Quantization, RunHistory, SimulationConfig,
};

/// Per-cycle absolute differences between two runs, over the common prefix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DivergenceReport {
    /// `|D_left - D_right|` per cycle.
    pub distance_diff: Vec<f64>,
    /// `|rabbit_heading_left - rabbit_heading_right|` per cycle.
    pub rabbit_heading_diff: Vec<f64>,
    /// Number of entries compared (seed included).
    pub compared: usize,
    pub left_len: usize,
    pub right_len: usize,
}

/// Elementwise absolute differences of distance and rabbit heading between
/// two histories in the same arithmetic, over the common prefix.
pub fn divergence<B: ArithBackend>(
    backend: &B,
    left: &RunHistory<B::Value>,
    right: &RunHistory<B::Value>,
) -> DivergenceReport {
    let left_len = left.len();
    let right_len = right.len();
    if left_len != right_len {
        warn!(
            left_len,
            right_len, "histories have different lengths; comparing common prefix"
        );
    }
    let compared = left_len.min(right_len);

    let abs_diff = |a: &B::Value, b: &B::Value| backend.lower(&backend.abs(&backend.sub(a, b)));
    let distance_diff = left
        .distances
        .iter()
        .zip(right.distances.iter())
        .map(|(a, b)| abs_diff(a, b))
        .collect();
    let rabbit_heading_diff = left
        .rabbit_headings
        .iter()
        .zip(right.rabbit_headings.iter())
        .map(|(a, b)| abs_diff(a, b))
        .collect();

    DivergenceReport {
        distance_diff,
        rabbit_heading_diff,
        compared,
        left_len,
        right_len,
    }
}

fn lift_point<B: ArithBackend>(backend: &B, point: &PlanePoint<f64>) -> PlanePoint<B::Value> {
    PlanePoint::new(backend.lift(point.x), backend.lift(point.y))
}

/// Lift a fixed-precision history into `backend`'s arithmetic, exactly.
///
/// Lifting rather than lowering keeps sub-ulp differences visible when a
/// `f64` run is diffed against an arbitrary-precision one.
pub fn lift_history<B: ArithBackend>(
    backend: &B,
    history: &RunHistory<f64>,
) -> RunHistory<B::Value> {
    RunHistory {
        distances: history.distances.iter().map(|v| backend.lift(*v)).collect(),
        rabbit_headings: history
            .rabbit_headings
            .iter()
            .map(|v| backend.lift(*v))
            .collect(),
        hunter_headings: history
            .hunter_headings
            .iter()
            .map(|v| backend.lift(*v))
            .collect(),
        steps: history.steps.iter().map(|v| backend.lift(*v)).collect(),
        rabbit_path: history
            .rabbit_path
            .iter()
            .map(|p| lift_point(backend, p))
            .collect(),
        hunter_path: history
            .hunter_path
            .iter()
            .map(|p| lift_point(backend, p))
            .collect(),
        total_traveled: backend.lift(history.total_traveled),
        cycles: history.cycles,
        outcome: history.outcome,
    }
}

/// Lower a history to the nearest-`f64` view consumed by plotting
/// collaborators.
pub fn history_to_f64<B: ArithBackend>(
    backend: &B,
    history: &RunHistory<B::Value>,
) -> RunHistory<f64> {
    let lower_point =
        |p: &PlanePoint<B::Value>| PlanePoint::new(backend.lower(&p.x), backend.lower(&p.y));
    RunHistory {
        distances: history.distances.iter().map(|v| backend.lower(v)).collect(),
        rabbit_headings: history
            .rabbit_headings
            .iter()
            .map(|v| backend.lower(v))
            .collect(),
        hunter_headings: history
            .hunter_headings
            .iter()
            .map(|v| backend.lower(v))
            .collect(),
        steps: history.steps.iter().map(|v| backend.lower(v)).collect(),
        rabbit_path: history.rabbit_path.iter().map(lower_point).collect(),
        hunter_path: history.hunter_path.iter().map(lower_point).collect(),
        total_traveled: backend.lower(&history.total_traveled),
        cycles: history.cycles,
        outcome: history.outcome,
    }
}

/// Run two configurations on one backend in parallel.
///
/// Runs share no state, so this is safe and keeps long comparison sweeps off
/// the critical path; each run is still sequential internally.
pub fn run_pair<B>(
    backend: &B,
    first: &SimulationConfig,
    second: &SimulationConfig,
) -> Result<(RunHistory<B::Value>, RunHistory<B::Value>), EngineError>
where
    B: ArithBackend + Sync,
{
    let (left, right) = rayon::join(
        || PursuitEngine::new(backend, first.clone())?.run(),
        || PursuitEngine::new(backend, second.clone())?.run(),
    );
    Ok((left?, right?))
}

/// Outcome of a fixed-precision vs arbitrary-precision comparison.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrecisionDivergence {
    /// History of the native `f64` run.
    pub float_history: RunHistory<f64>,
    /// `f64` view of the arbitrary-precision run.
    pub decimal_history: RunHistory<f64>,
    pub report: DivergenceReport,
}

/// Run the continuous-step recurrence at both precisions and diff them.
pub fn precision_divergence(
    config: &SimulationConfig,
    digits: u32,
) -> Result<PrecisionDivergence, EngineError> {
    let decimal = DecimalBackend::new(digits)?;
    let float = Float64Backend;
    let (float_run, decimal_run) = rayon::join(
        || PursuitEngine::new(&float, config.clone())?.run(),
        || PursuitEngine::new(&decimal, config.clone())?.run(),
    );
    let float_history = float_run?;
    let decimal_run = decimal_run?;

    let lifted = lift_history(&decimal, &float_history);
    let report = divergence(&decimal, &decimal_run, &lifted);
    Ok(PrecisionDivergence {
        float_history,
        decimal_history: history_to_f64(&decimal, &decimal_run),
        report,
    })
}

/// Outcome of a continuous-step vs unit-step comparison, both at arbitrary
/// precision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleDivergence {
    pub continuous: RunHistory<f64>,
    pub unit: RunHistory<f64>,
    pub report: DivergenceReport,
}

/// Run both quantization rules at arbitrary precision and diff them.
pub fn rule_divergence(
    config: &SimulationConfig,
    digits: u32,
) -> Result<RuleDivergence, EngineError> {
    let backend = DecimalBackend::new(digits)?;
    let continuous_config = SimulationConfig {
        quantization: Quantization::Continuous,
        ..config.clone()
    };
    let unit_config = SimulationConfig {
        quantization: Quantization::UnitCeiling,
        ..config.clone()
    };
    let (continuous_run, unit_run) = run_pair(&backend, &continuous_config, &unit_config)?;
    let report = divergence(&backend, &continuous_run, &unit_run);
    Ok(RuleDivergence {
        continuous: history_to_f64(&backend, &continuous_run),
        unit: history_to_f64(&backend, &unit_run),
        report,
    })
}
