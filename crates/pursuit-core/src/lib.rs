//! Core engine for the hunter/rabbit pursuit simulation.
//!
//! Two point agents move in the plane: the rabbit flees, the hunter pursues.
//! Each cycle both agents travel in a straight line and then turn. Distance
//! evolves by a closed-form geometric recurrence rather than by measuring the
//! positions, which keeps the iteration cheap enough to run for millions of
//! cycles. One parameterized engine covers every rule/precision variant:
//! step quantization is a [`Quantization`] strategy and arithmetic is an
//! [`ArithBackend`] capability, so the fixed-precision and
//! arbitrary-precision engines share a single code path and can be diffed
//! against each other by the comparison drivers in [`compare`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub mod arith;
pub mod compare;

pub use arith::{ArithBackend, DecimalBackend, Float64Backend, wrap_heading};
pub use compare::{
    DivergenceReport, PrecisionDivergence, RuleDivergence, divergence, history_to_f64,
    lift_history, precision_divergence, rule_divergence, run_pair,
};

/// Errors raised while configuring or running a pursuit simulation.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// `asin` was invoked with an argument outside `[-1, 1]`.
    #[error("asin argument {value} outside [-1, 1] at cycle {cycle}")]
    AsinDomain { cycle: u64, value: f64 },
    /// `sqrt` was invoked on a negative radicand.
    #[error("negative sqrt radicand {value} at cycle {cycle}")]
    SqrtDomain { cycle: u64, value: f64 },
}

/// Step-length quantization rule applied each cycle.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Quantization {
    /// Step length is the continuous value `a * D`.
    #[default]
    Continuous,
    /// Step length is `ceil(a * D)`: both agents take the maximum possible
    /// number of unit-length moves, matching the olympiad rule that every
    /// move has length exactly 1.
    UnitCeiling,
}

impl Quantization {
    fn apply<B: ArithBackend>(self, backend: &B, raw: &B::Value) -> B::Value {
        match self {
            Self::Continuous => raw.clone(),
            Self::UnitCeiling => backend.ceil(raw),
        }
    }
}

/// Static configuration for a single pursuit run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// Scaling coefficient `a`: next cycle's step length is derived from the
    /// current distance as `quantize(a * D)`. Must be positive.
    pub scaling: f64,
    /// Stopping threshold on the distance between the agents. The run ends
    /// after the first cycle whose distance exceeds it, so the final recorded
    /// distance may overshoot. Must be positive.
    pub distance_limit: f64,
    /// Safety bound on the number of cycles executed. Reaching it is
    /// reported as [`RunOutcome::MaxCyclesReached`], never conflated with a
    /// genuine crossing of the distance limit.
    pub max_cycles: u64,
    /// Step-length quantization rule.
    pub quantization: Quantization,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            scaling: 2.0,
            distance_limit: 100.0,
            max_cycles: u64::MAX,
            quantization: Quantization::Continuous,
        }
    }
}

impl SimulationConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.scaling.is_finite() && self.scaling > 0.0) {
            return Err(EngineError::InvalidConfig(
                "scaling coefficient must be positive and finite",
            ));
        }
        if !(self.distance_limit.is_finite() && self.distance_limit > 0.0) {
            return Err(EngineError::InvalidConfig(
                "distance limit must be positive and finite",
            ));
        }
        if self.max_cycles == 0 {
            return Err(EngineError::InvalidConfig("max_cycles must be non-zero"));
        }
        Ok(())
    }
}

/// A point in the plane, in the backend's scalar representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanePoint<V> {
    pub x: V,
    pub y: V,
}

impl<V> PlanePoint<V> {
    /// Construct a new point.
    #[must_use]
    pub const fn new(x: V, y: V) -> Self {
        Self { x, y }
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RunOutcome {
    /// The distance between the agents exceeded the configured limit.
    DistanceLimitReached,
    /// The cycle safety bound was exhausted first; the history is a
    /// truncated run, not a completed escape.
    MaxCyclesReached,
}

/// Snapshot of the simulation after one completed cycle.
///
/// The recorded step and headings are the ones that will drive the *next*
/// cycle; positions and distance are as of the end of this cycle. Cycle 0 is
/// the seed record describing the canonical initial state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleRecord<V> {
    pub cycle: u64,
    pub distance: V,
    pub step: V,
    pub rabbit_heading: V,
    pub hunter_heading: V,
    pub rabbit: PlanePoint<V>,
    pub hunter: PlanePoint<V>,
    /// Running total of distance traveled by the rabbit.
    pub traveled: V,
}

/// Complete per-cycle history of a finished run.
///
/// Every sequence holds `cycles + 1` entries: the cycle-0 seed plus one entry
/// per completed cycle. External plotting collaborators consume the `f64`
/// view produced by [`compare::history_to_f64`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunHistory<V> {
    pub distances: Vec<V>,
    pub rabbit_headings: Vec<V>,
    pub hunter_headings: Vec<V>,
    pub steps: Vec<V>,
    pub rabbit_path: Vec<PlanePoint<V>>,
    pub hunter_path: Vec<PlanePoint<V>>,
    /// Total distance traveled by the rabbit over the whole run.
    pub total_traveled: V,
    /// Number of completed cycles.
    pub cycles: u64,
    pub outcome: RunOutcome,
}

impl<V> RunHistory<V> {
    /// Number of recorded entries (seed included) in each sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// True when only the seed entry exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.distances.len() <= 1
    }
}

/// Cycle interval between progress notifications.
pub const PROGRESS_INTERVAL: u64 = 10_000;

/// Observer notified periodically while a run is in flight.
///
/// Purely observational: implementations must not influence the computation.
pub trait ProgressObserver {
    fn on_progress(&mut self, cycle: u64, distance: f64);
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressObserver for NullProgress {
    fn on_progress(&mut self, _cycle: u64, _distance: f64) {}
}

/// Observer that emits an INFO tracing event per notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn on_progress(&mut self, cycle: u64, distance: f64) {
        info!(cycle, distance, "pursuit run in progress");
    }
}

/// Mutable per-cycle state, owned exclusively by one run.
struct CycleState<V> {
    cycle: u64,
    step: V,
    distance: V,
    traveled: V,
    rabbit_heading: V,
    hunter_heading: V,
    rabbit: PlanePoint<V>,
    hunter: PlanePoint<V>,
}

impl<V: Clone> CycleState<V> {
    fn record(&self) -> CycleRecord<V> {
        CycleRecord {
            cycle: self.cycle,
            distance: self.distance.clone(),
            step: self.step.clone(),
            rabbit_heading: self.rabbit_heading.clone(),
            hunter_heading: self.hunter_heading.clone(),
            rabbit: self.rabbit.clone(),
            hunter: self.hunter.clone(),
            traveled: self.traveled.clone(),
        }
    }
}

/// Pursuit recurrence engine, parameterized over arithmetic backend and
/// step quantization.
pub struct PursuitEngine<'a, B: ArithBackend> {
    backend: &'a B,
    config: SimulationConfig,
}

impl<'a, B: ArithBackend> PursuitEngine<'a, B> {
    /// Build an engine, validating the configuration up front.
    pub fn new(backend: &'a B, config: SimulationConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { backend, config })
    }

    /// The configuration this engine runs with.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Expose the run as a lazy sequence of cycle records (seed first).
    ///
    /// Callers that only need aggregate statistics can consume this without
    /// retaining the full history in memory.
    #[must_use]
    pub fn records(&self) -> CycleIter<'a, B> {
        CycleIter::new(self.backend, self.config.clone())
    }

    /// Run to termination, logging progress every [`PROGRESS_INTERVAL`]
    /// cycles via tracing.
    pub fn run(&self) -> Result<RunHistory<B::Value>, EngineError> {
        self.run_with_observer(&mut TracingProgress)
    }

    /// Run to termination, forwarding progress to `observer`.
    pub fn run_with_observer(
        &self,
        observer: &mut dyn ProgressObserver,
    ) -> Result<RunHistory<B::Value>, EngineError> {
        let mut records = self.records();
        let mut distances = Vec::new();
        let mut rabbit_headings = Vec::new();
        let mut hunter_headings = Vec::new();
        let mut steps = Vec::new();
        let mut rabbit_path = Vec::new();
        let mut hunter_path = Vec::new();
        let mut total_traveled = self.backend.lift(0.0);
        let mut cycles = 0;

        while let Some(item) = records.next() {
            let record = item?;
            if record.cycle > 0 && record.cycle % PROGRESS_INTERVAL == 0 {
                observer.on_progress(record.cycle, self.backend.lower(&record.distance));
            }
            cycles = record.cycle;
            total_traveled = record.traveled.clone();
            distances.push(record.distance);
            rabbit_headings.push(record.rabbit_heading);
            hunter_headings.push(record.hunter_heading);
            steps.push(record.step);
            rabbit_path.push(record.rabbit);
            hunter_path.push(record.hunter);
        }

        let outcome = records.outcome().unwrap_or(RunOutcome::MaxCyclesReached);
        Ok(RunHistory {
            distances,
            rabbit_headings,
            hunter_headings,
            steps,
            rabbit_path,
            hunter_path,
            total_traveled,
            cycles,
            outcome,
        })
    }
}

/// Lazy iterator over the cycle records of one run.
///
/// Yields the cycle-0 seed first, then one record per completed cycle, and
/// stops after the first record whose distance exceeds the configured limit
/// or once the cycle safety bound is exhausted. A domain fault yields a
/// single `Err` and ends the iteration.
pub struct CycleIter<'a, B: ArithBackend> {
    backend: &'a B,
    config: SimulationConfig,
    limit: B::Value,
    one: B::Value,
    scaling: B::Value,
    state: Option<CycleState<B::Value>>,
    seed_emitted: bool,
    outcome: Option<RunOutcome>,
}

impl<'a, B: ArithBackend> CycleIter<'a, B> {
    fn new(backend: &'a B, config: SimulationConfig) -> Self {
        let zero = backend.lift(0.0);
        let one = backend.lift(1.0);
        let limit = backend.lift(config.distance_limit);
        let scaling = backend.lift(config.scaling);
        let state = CycleState {
            cycle: 0,
            step: one.clone(),
            distance: zero.clone(),
            traveled: zero.clone(),
            rabbit_heading: zero.clone(),
            hunter_heading: zero.clone(),
            rabbit: PlanePoint::new(zero.clone(), zero.clone()),
            hunter: PlanePoint::new(zero.clone(), zero),
        };
        Self {
            backend,
            config,
            limit,
            one,
            scaling,
            state: Some(state),
            seed_emitted: false,
            outcome: None,
        }
    }

    /// Why the iteration stopped; `None` while records remain or after a
    /// domain fault.
    #[must_use]
    pub fn outcome(&self) -> Option<RunOutcome> {
        self.outcome
    }

    /// `asin(1/x)`, guarded: the argument leaves `[-1, 1]` whenever `x < 1`,
    /// which must surface as a fault rather than be clamped.
    fn asin_inverse(&self, x: &B::Value, cycle: u64) -> Result<B::Value, EngineError> {
        if *x < self.one {
            let value = self.backend.lower(&self.backend.div(&self.one, x));
            return Err(EngineError::AsinDomain { cycle, value });
        }
        Ok(self.backend.asin(&self.backend.div(&self.one, x)))
    }

    fn advance(&mut self, state: &mut CycleState<B::Value>) -> Result<(), EngineError> {
        let backend = self.backend;
        state.cycle += 1;
        let cycle = state.cycle;

        if cycle == 1 {
            // The geometric recurrence needs a nonzero prior distance, so the
            // opening cycle is fixed: the rabbit takes its unit move while
            // the hunter, knowing nothing yet, stays at the origin.
            state.distance = self.one.clone();
            state.traveled = backend.add(&state.traveled, &self.one);

            let dx = backend.mul(&state.step, &backend.cos(&state.rabbit_heading));
            let dy = backend.mul(&state.step, &backend.sin(&state.rabbit_heading));
            state.rabbit.x = backend.add(&state.rabbit.x, &dx);
            state.rabbit.y = backend.add(&state.rabbit.y, &dy);

            state.step = self.config.quantization.apply(backend, &self.scaling);

            let turn = self.asin_inverse(&state.step, cycle)?;
            state.rabbit_heading =
                wrap_heading(backend, &backend.add(&state.rabbit_heading, &turn));
            return Ok(());
        }

        // Closed-form distance recurrence: the prior step is the hypotenuse
        // of a right triangle with unit opposite side, whose adjacent leg
        // projects the previous geometry forward.
        if state.step < self.one {
            let radicand = backend.sub(&backend.mul(&state.step, &state.step), &self.one);
            return Err(EngineError::SqrtDomain {
                cycle,
                value: backend.lower(&radicand),
            });
        }
        let m_dist = backend.sqrt(&backend.sub(
            &backend.mul(&state.step, &state.step),
            &self.one,
        ));
        let x_diff = backend.add(&backend.sub(&m_dist, &state.step), &state.distance);
        state.distance = backend.hypot(&x_diff, &self.one);

        state.traveled = backend.add(&state.traveled, &state.step);

        // Heading contribution of the step we are about to retire; the
        // rabbit removes it again below.
        let alfa_old = self.asin_inverse(&state.step, cycle)?;

        let rabbit_dx = backend.mul(&state.step, &backend.cos(&state.rabbit_heading));
        let rabbit_dy = backend.mul(&state.step, &backend.sin(&state.rabbit_heading));
        state.rabbit.x = backend.add(&state.rabbit.x, &rabbit_dx);
        state.rabbit.y = backend.add(&state.rabbit.y, &rabbit_dy);

        let hunter_dx = backend.mul(&state.step, &backend.cos(&state.hunter_heading));
        let hunter_dy = backend.mul(&state.step, &backend.sin(&state.hunter_heading));
        state.hunter.x = backend.add(&state.hunter.x, &hunter_dx);
        state.hunter.y = backend.add(&state.hunter.y, &hunter_dy);

        // The hunter always turns based on the current distance.
        let distance_turn = self.asin_inverse(&state.distance, cycle)?;
        state.hunter_heading = wrap_heading(
            backend,
            &backend.add(&state.hunter_heading, &distance_turn),
        );

        let raw_step = backend.mul(&self.scaling, &state.distance);
        state.step = self.config.quantization.apply(backend, &raw_step);

        // Three-term correction: the new step's implied turn plus the
        // current distance's implied turn, minus the stale previous-step
        // turn.
        let step_turn = self.asin_inverse(&state.step, cycle)?;
        let mut heading = backend.add(&state.rabbit_heading, &step_turn);
        heading = backend.add(&heading, &distance_turn);
        heading = backend.sub(&heading, &alfa_old);
        state.rabbit_heading = wrap_heading(backend, &heading);
        Ok(())
    }
}

impl<'a, B: ArithBackend> Iterator for CycleIter<'a, B> {
    type Item = Result<CycleRecord<B::Value>, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.seed_emitted {
            self.seed_emitted = true;
            return self.state.as_ref().map(|state| Ok(state.record()));
        }
        if self.outcome.is_some() {
            return None;
        }
        let mut state = self.state.take()?;
        if state.cycle >= self.config.max_cycles {
            self.outcome = Some(RunOutcome::MaxCyclesReached);
            return None;
        }
        if let Err(fault) = self.advance(&mut state) {
            return Some(Err(fault));
        }
        let record = state.record();
        if state.distance > self.limit {
            self.outcome = Some(RunOutcome::DistanceLimitReached);
        } else {
            self.state = Some(state);
        }
        Some(Ok(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn continuous_config(limit: f64) -> SimulationConfig {
        SimulationConfig {
            scaling: 2.0,
            distance_limit: limit,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn config_validation_rejects_bad_parameters() {
        let backend = Float64Backend;
        for config in [
            SimulationConfig {
                scaling: 0.0,
                ..SimulationConfig::default()
            },
            SimulationConfig {
                scaling: -2.0,
                ..SimulationConfig::default()
            },
            SimulationConfig {
                distance_limit: 0.0,
                ..SimulationConfig::default()
            },
            SimulationConfig {
                max_cycles: 0,
                ..SimulationConfig::default()
            },
        ] {
            assert!(matches!(
                PursuitEngine::new(&backend, config),
                Err(EngineError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn seed_record_is_canonical() {
        let backend = Float64Backend;
        let engine = PursuitEngine::new(&backend, continuous_config(100.0)).expect("engine");
        let seed = engine.records().next().expect("seed").expect("seed ok");
        assert_eq!(seed.cycle, 0);
        assert_eq!(seed.distance, 0.0);
        assert_eq!(seed.step, 1.0);
        assert_eq!(seed.rabbit_heading, 0.0);
        assert_eq!(seed.hunter_heading, 0.0);
        assert_eq!(seed.rabbit, PlanePoint::new(0.0, 0.0));
        assert_eq!(seed.hunter, PlanePoint::new(0.0, 0.0));
        assert_eq!(seed.traveled, 0.0);
    }

    #[test]
    fn first_cycle_matches_known_values_continuous() {
        let backend = Float64Backend;
        let engine = PursuitEngine::new(&backend, continuous_config(100.0)).expect("engine");
        let mut records = engine.records();
        records.next();
        let first = records.next().expect("cycle 1").expect("cycle 1 ok");
        assert_eq!(first.cycle, 1);
        assert_eq!(first.distance, 1.0);
        assert_eq!(first.step, 2.0);
        assert!((first.rabbit_heading - 0.5f64.asin()).abs() < 1e-9);
        assert_eq!(first.hunter_heading, 0.0);
        assert_eq!(first.rabbit, PlanePoint::new(1.0, 0.0));
        assert_eq!(first.hunter, PlanePoint::new(0.0, 0.0));
        assert_eq!(first.traveled, 1.0);
    }

    #[test]
    fn first_cycle_quantizes_step_in_unit_mode() {
        let backend = Float64Backend;
        let config = SimulationConfig {
            scaling: 2.3,
            quantization: Quantization::UnitCeiling,
            ..SimulationConfig::default()
        };
        let engine = PursuitEngine::new(&backend, config).expect("engine");
        let mut records = engine.records();
        records.next();
        let first = records.next().expect("cycle 1").expect("cycle 1 ok");
        assert_eq!(first.step, 3.0);
    }

    #[test]
    fn history_sequences_share_one_length() {
        let backend = Float64Backend;
        let engine = PursuitEngine::new(&backend, continuous_config(10.0)).expect("engine");
        let history = engine.run_with_observer(&mut NullProgress).expect("run");
        let expected = usize::try_from(history.cycles + 1).expect("length fits usize");
        assert_eq!(history.distances.len(), expected);
        assert_eq!(history.rabbit_headings.len(), expected);
        assert_eq!(history.hunter_headings.len(), expected);
        assert_eq!(history.steps.len(), expected);
        assert_eq!(history.rabbit_path.len(), expected);
        assert_eq!(history.hunter_path.len(), expected);
    }

    #[test]
    fn run_stops_at_first_limit_crossing() {
        let backend = Float64Backend;
        let limit = 25.0;
        let engine = PursuitEngine::new(&backend, continuous_config(limit)).expect("engine");
        let history = engine.run_with_observer(&mut NullProgress).expect("run");
        assert_eq!(history.outcome, RunOutcome::DistanceLimitReached);
        let (last, earlier) = history.distances.split_last().expect("non-empty");
        assert!(*last > limit);
        assert!(earlier.iter().all(|d| *d <= limit));
    }

    #[test]
    fn traveled_accumulates_by_prior_step() {
        let backend = Float64Backend;
        let engine = PursuitEngine::new(&backend, continuous_config(15.0)).expect("engine");
        let records: Vec<_> = engine
            .records()
            .collect::<Result<_, _>>()
            .expect("clean run");
        assert_eq!(records[1].traveled, 1.0);
        for pair in records.windows(2).skip(1) {
            let delta = pair[1].traveled - pair[0].traveled;
            assert!(
                (delta - pair[0].step).abs() < 1e-9,
                "cycle {} advanced traveled by {delta}, step was {}",
                pair[1].cycle,
                pair[0].step
            );
        }
    }

    #[test]
    fn unit_mode_steps_are_integral_ceilings() {
        let backend = Float64Backend;
        let config = SimulationConfig {
            scaling: 2.0,
            distance_limit: 20.0,
            quantization: Quantization::UnitCeiling,
            ..SimulationConfig::default()
        };
        let engine = PursuitEngine::new(&backend, config).expect("engine");
        let history = engine.run_with_observer(&mut NullProgress).expect("run");
        for (distance, step) in history
            .distances
            .iter()
            .zip(history.steps.iter())
            .skip(1)
        {
            assert_eq!(*step, (2.0 * distance).ceil());
            assert!(*step >= 1.0);
            assert_eq!(step.fract(), 0.0);
        }
    }

    #[test]
    fn max_cycles_truncation_is_flagged() {
        let backend = Float64Backend;
        let config = SimulationConfig {
            scaling: 2.0,
            distance_limit: 1e12,
            max_cycles: 5,
            ..SimulationConfig::default()
        };
        let engine = PursuitEngine::new(&backend, config).expect("engine");
        let history = engine.run_with_observer(&mut NullProgress).expect("run");
        assert_eq!(history.outcome, RunOutcome::MaxCyclesReached);
        assert_eq!(history.cycles, 5);
        assert_eq!(history.len(), 6);
    }

    #[test]
    fn sub_unit_scaling_surfaces_domain_fault() {
        let backend = Float64Backend;
        let config = SimulationConfig {
            scaling: 0.5,
            ..SimulationConfig::default()
        };
        let engine = PursuitEngine::new(&backend, config).expect("engine");
        let fault = engine.run_with_observer(&mut NullProgress).expect_err("fault");
        assert!(matches!(fault, EngineError::AsinDomain { cycle: 1, .. }));
    }

    #[test]
    fn unit_mode_tolerates_sub_unit_scaling() {
        // ceil(0.5) = 1 keeps every step at the asin domain boundary, so the
        // unit-rule variant runs where the continuous one faults.
        let backend = Float64Backend;
        let config = SimulationConfig {
            scaling: 0.5,
            distance_limit: 2.0,
            max_cycles: 50,
            quantization: Quantization::UnitCeiling,
        };
        let engine = PursuitEngine::new(&backend, config).expect("engine");
        let history = engine.run_with_observer(&mut NullProgress).expect("run");
        assert!(history.steps.iter().all(|step| *step >= 1.0));
    }

    #[test]
    fn reruns_are_bit_identical() {
        let backend = Float64Backend;
        let engine = PursuitEngine::new(&backend, continuous_config(40.0)).expect("engine");
        let first = engine.run_with_observer(&mut NullProgress).expect("run");
        let second = engine.run_with_observer(&mut NullProgress).expect("run");
        assert_eq!(first, second);
    }

    #[test]
    fn decimal_reruns_are_digit_identical() {
        let backend = DecimalBackend::new(50).expect("backend");
        let config = SimulationConfig {
            max_cycles: 200,
            ..continuous_config(1e9)
        };
        let engine = PursuitEngine::new(&backend, config).expect("engine");
        let first = engine.run_with_observer(&mut NullProgress).expect("run");
        let second = engine.run_with_observer(&mut NullProgress).expect("run");
        assert_eq!(first, second);
    }

    #[test]
    fn lazy_records_match_collected_history() {
        let backend = Float64Backend;
        let engine = PursuitEngine::new(&backend, continuous_config(12.0)).expect("engine");
        let history = engine.run_with_observer(&mut NullProgress).expect("run");
        let records: Vec<_> = engine
            .records()
            .collect::<Result<_, _>>()
            .expect("clean run");
        assert_eq!(records.len(), history.len());
        for (record, distance) in records.iter().zip(history.distances.iter()) {
            assert_eq!(record.distance, *distance);
        }
        let last = records.last().expect("non-empty");
        assert_eq!(last.traveled, history.total_traveled);
    }

    #[test]
    fn progress_observer_fires_on_interval() {
        struct Counting(Vec<u64>);
        impl ProgressObserver for Counting {
            fn on_progress(&mut self, cycle: u64, _distance: f64) {
                self.0.push(cycle);
            }
        }

        let backend = Float64Backend;
        let config = SimulationConfig {
            distance_limit: 1e12,
            max_cycles: 25_000,
            ..continuous_config(1e12)
        };
        let engine = PursuitEngine::new(&backend, config).expect("engine");
        let mut observer = Counting(Vec::new());
        engine.run_with_observer(&mut observer).expect("run");
        assert_eq!(observer.0, vec![10_000, 20_000]);
    }
}
