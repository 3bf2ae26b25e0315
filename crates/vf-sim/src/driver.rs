//! Simulation driver: the fixed-step loop, termination and batched output.
//!
//! A driver moves through
//! `Initializing → Stepping → (Converged | TimedOut | Failed) → Finalizing → Done`.
//! Construction performs initialization, so configuration and initial
//! property errors surface before any row exists. Iterating the driver yields
//! [`StreamMessage::Chunk`]s of `batch_size` rows, then exactly one terminal
//! message. The cancel token is checked before each batch.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::config::{InitialConditions, SimulationConfig, VesselSpec};
use crate::error::{SimError, SimResult};
use crate::record::{GuardEvent, KpiSummary, SimulationRow, StreamMessage, Termination};
use crate::vessel::{PRESSURE_FLOOR_PA, VesselPair, VesselUpdate};
use vf_components::{FlowRegime, FlowRegimeCalculator, ValveProfile};
use vf_core::units::{k, pa};
use vf_fluids::{Composition, GasProperties, PengRobinson, PropertyProvider};

/// Flow below this share of the peak counts as settled.
pub const CONVERGENCE_FRACTION: f64 = 1e-3;

/// Slack for comparing accumulated step times against config times, s.
const TIME_EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Initializing,
    Stepping,
    Converged,
    TimedOut,
    Failed,
    Finalizing,
    Done,
}

/// Final status of a run drained with [`SimulationDriver::run_to_end`].
#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    Converged,
    TimedOut,
    Failed(SimError),
    Cancelled,
}

/// Everything a drained run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub rows: Vec<SimulationRow>,
    /// Absent for a cancelled run.
    pub kpi: Option<KpiSummary>,
    pub status: RunStatus,
}

pub struct SimulationDriver {
    config: SimulationConfig,
    valve: ValveProfile,
    calculator: FlowRegimeCalculator,
    provider: Arc<dyn PropertyProvider>,
    /// `None` when properties are manual constants.
    composition: Option<Composition>,
    vessels: VesselPair,
    max_time: f64,
    step: u64,
    peak_flow: f64,
    rows: Vec<SimulationRow>,
    /// Rows already handed out.
    emitted: usize,
    state: DriverState,
    termination: Option<Termination>,
    failure: Option<SimError>,
    cancel: CancelToken,
}

impl SimulationDriver {
    /// Driver using the Peng-Robinson provider for composition-based properties.
    pub fn new(config: SimulationConfig, initial: InitialConditions) -> SimResult<Self> {
        Self::with_provider(config, initial, Arc::new(PengRobinson::new()))
    }

    pub fn with_provider(
        config: SimulationConfig,
        initial: InitialConditions,
        provider: Arc<dyn PropertyProvider>,
    ) -> SimResult<Self> {
        info!(
            mode = config.mode.label(),
            provider = provider.name(),
            "initializing simulation"
        );
        config.validate()?;
        initial.validate()?;

        let valve = config.valve_profile()?;
        let calculator = config.flow_calculator()?;
        let composition = config.properties.composition()?;

        let initial_props = |spec: &VesselSpec| -> SimResult<GasProperties> {
            match &composition {
                Some(comp) => {
                    let props =
                        provider.properties(comp, pa(spec.pressure), k(spec.temperature))?;
                    props.validate()?;
                    Ok(props)
                }
                None => Ok(config.properties.manual_properties().unwrap_or_default()),
            }
        };
        let upstream_props = initial_props(&initial.upstream)?;
        let downstream_props = initial_props(&initial.downstream)?;
        let vessels = VesselPair::new(config.mode, &initial, upstream_props, downstream_props);

        let mut driver = Self {
            max_time: config.effective_max_time(),
            config,
            valve,
            calculator,
            provider,
            composition,
            vessels,
            step: 0,
            peak_flow: 0.0,
            rows: Vec::new(),
            emitted: 0,
            state: DriverState::Initializing,
            termination: None,
            failure: None,
            cancel: CancelToken::new(),
        };

        let first = driver.row(
            0.0,
            driver.valve.fraction(0.0),
            0.0,
            FlowRegime::None,
            &VesselUpdate::default(),
            None,
        );
        driver.rows.push(first);
        driver.transition(DriverState::Stepping);
        Ok(driver)
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn vessels(&self) -> &VesselPair {
        &self.vessels
    }

    /// All rows produced so far, emitted or not.
    pub fn rows(&self) -> &[SimulationRow] {
        &self.rows
    }

    /// Token that stops the run at the next batch boundary.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The error that stopped a failed run.
    pub fn failure(&self) -> Option<&SimError> {
        self.failure.as_ref()
    }

    /// Drain every message and collect the rows, summary and status.
    pub fn run_to_end(mut self) -> RunOutcome {
        let mut rows = Vec::new();
        let mut kpi = None;
        while let Some(message) = self.next() {
            match message {
                StreamMessage::Chunk { rows: batch, .. } => rows.extend(batch),
                StreamMessage::Complete {
                    rows: batch,
                    kpi: summary,
                    ..
                }
                | StreamMessage::Error {
                    rows: batch,
                    kpi: summary,
                    ..
                } => {
                    rows.extend(batch);
                    kpi = Some(summary);
                }
                StreamMessage::Cancelled { .. } => {}
            }
        }

        let status = match (self.failure.take(), self.termination) {
            (Some(err), _) => RunStatus::Failed(err),
            (None, Some(Termination::Converged)) => RunStatus::Converged,
            (None, Some(Termination::TimedOut)) => RunStatus::TimedOut,
            (None, _) => RunStatus::Cancelled,
        };
        RunOutcome { rows, kpi, status }
    }

    fn transition(&mut self, next: DriverState) {
        info!(from = ?self.state, to = ?next, "driver state");
        self.state = next;
    }

    fn row(
        &self,
        time: f64,
        fraction: f64,
        mass_flow: f64,
        regime: FlowRegime,
        update: &VesselUpdate,
        guard: Option<GuardEvent>,
    ) -> SimulationRow {
        let props = self.vessels.reported().props;
        SimulationRow {
            time,
            upstream_pressure: self.vessels.upstream.pressure.value,
            downstream_pressure: self.vessels.downstream.pressure.value,
            mass_flow_rate: mass_flow,
            valve_opening_fraction: fraction,
            flow_regime: regime,
            z: props.z,
            k: props.k,
            molar_mass: props.molar_mass,
            dp_dt_upstream: update.dp_dt_upstream,
            dp_dt_downstream: update.dp_dt_downstream,
            guard,
        }
    }

    /// One time step. Returns the termination reached, if any.
    fn advance(&mut self) -> SimResult<Option<Termination>> {
        self.step += 1;
        let dt = self.config.time_step;
        let t = self.step as f64 * dt;
        let fraction = self.valve.fraction(t);

        let up = &self.vessels.upstream;
        let flow = self.calculator.evaluate(
            up.pressure,
            self.vessels.downstream.pressure,
            up.temperature,
            &up.props,
            fraction,
        )?;
        let molar_mass = up.props.molar_mass;

        let mut guard = None;
        if flow.bracket_clamped {
            warn!(t, "subsonic bracket clamped at zero");
            guard = Some(GuardEvent::BracketClamp);
        }

        let before = (
            self.vessels.upstream.pressure.value,
            self.vessels.downstream.pressure.value,
        );
        let mut update = self.vessels.step(flow.mass_flow.value, molar_mass, dt);
        let mut mass_flow = flow.mass_flow.value;
        let mut regime = flow.regime;
        if update.floor_clamped {
            warn!(t, floor_pa = PRESSURE_FLOOR_PA, "upstream pressure clamped at floor");
            mass_flow = update.moles_transferred * molar_mass / dt;
            regime = FlowRegime::None;
            guard = Some(GuardEvent::PressureFloor);
        }

        if let Some(comp) = &self.composition {
            self.vessels.refresh_properties(self.provider.as_ref(), comp)?;
            // Report the rates of the re-derived pressures
            if self.config.mode.upstream_evolves() {
                update.dp_dt_upstream = (self.vessels.upstream.pressure.value - before.0) / dt;
            }
            if self.config.mode.downstream_evolves() {
                update.dp_dt_downstream =
                    (self.vessels.downstream.pressure.value - before.1) / dt;
            }
        }

        self.peak_flow = self.peak_flow.max(mass_flow.abs());
        let row = self.row(t, fraction, mass_flow, regime, &update, guard);
        self.rows.push(row);

        Ok(self.check_termination(t, mass_flow))
    }

    fn check_termination(&self, t: f64, mass_flow: f64) -> Option<Termination> {
        let valve_settled = t + TIME_EPS >= self.valve.travel_time();
        let flow_settled =
            self.peak_flow == 0.0 || mass_flow.abs() < CONVERGENCE_FRACTION * self.peak_flow;
        if valve_settled && flow_settled {
            Some(Termination::Converged)
        } else if t + TIME_EPS >= self.max_time {
            Some(Termination::TimedOut)
        } else {
            None
        }
    }

    fn take_pending(&mut self) -> Vec<SimulationRow> {
        let rows = self.rows[self.emitted..].to_vec();
        self.emitted = self.rows.len();
        rows
    }

    fn finalize(&mut self) -> StreamMessage {
        let termination = match self.state {
            DriverState::Converged => Termination::Converged,
            DriverState::TimedOut => Termination::TimedOut,
            _ => Termination::Failed,
        };
        self.termination = Some(termination);
        self.transition(DriverState::Finalizing);

        let kpi = KpiSummary::from_rows(&self.rows, self.config.mode, termination);
        let rows = self.take_pending();
        let total_rows = self.emitted;
        info!(
            ?termination,
            total_rows,
            peak_flow_rate = kpi.peak_flow_rate,
            final_pressure = kpi.final_pressure,
            "simulation finished"
        );
        self.transition(DriverState::Done);

        match &self.failure {
            Some(err) => StreamMessage::Error {
                rows,
                total_rows,
                message: err.to_string(),
                kpi,
            },
            None => StreamMessage::Complete {
                rows,
                total_rows,
                kpi,
            },
        }
    }
}

impl Iterator for SimulationDriver {
    type Item = StreamMessage;

    fn next(&mut self) -> Option<StreamMessage> {
        match self.state {
            DriverState::Stepping => {}
            DriverState::Converged | DriverState::TimedOut | DriverState::Failed => {
                return Some(self.finalize());
            }
            DriverState::Initializing | DriverState::Finalizing | DriverState::Done => {
                return None;
            }
        }

        if self.cancel.is_cancelled() {
            info!(total_rows = self.emitted, "simulation cancelled");
            self.transition(DriverState::Done);
            return Some(StreamMessage::Cancelled {
                total_rows: self.emitted,
            });
        }

        while self.rows.len() - self.emitted < self.config.batch_size {
            match self.advance() {
                Ok(None) => {}
                Ok(Some(Termination::Converged)) => {
                    self.transition(DriverState::Converged);
                    break;
                }
                Ok(Some(Termination::TimedOut)) => {
                    self.transition(DriverState::TimedOut);
                    break;
                }
                Ok(Some(Termination::Failed)) => {
                    self.transition(DriverState::Failed);
                    break;
                }
                Err(err) => {
                    warn!(step = self.step, error = %err, "step failed");
                    self.failure = Some(err);
                    self.transition(DriverState::Failed);
                    break;
                }
            }
        }

        if self.state != DriverState::Stepping {
            return Some(self.finalize());
        }

        let rows = self.take_pending();
        debug!(
            rows = rows.len(),
            total_rows = self.emitted,
            time = ?rows.last().map(|r| r.time),
            "batch"
        );
        Some(StreamMessage::Chunk {
            rows,
            total_rows: self.emitted,
        })
    }
}
