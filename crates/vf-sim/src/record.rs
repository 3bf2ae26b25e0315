//! Emitted rows, summary indicators and stream messages.

use serde::{Deserialize, Serialize};

use crate::config::OperatingMode;
use vf_components::FlowRegime;

/// Non-fatal numeric correction applied on a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuardEvent {
    /// The draining vessel was held at the pressure floor.
    PressureFloor,
    /// The subsonic bracket was clamped at zero.
    BracketClamp,
}

/// One sample of the run, SI absolute units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRow {
    /// s
    pub time: f64,
    /// Pa
    pub upstream_pressure: f64,
    /// Pa
    pub downstream_pressure: f64,
    /// kg/s
    pub mass_flow_rate: f64,
    pub valve_opening_fraction: f64,
    pub flow_regime: FlowRegime,
    pub z: f64,
    pub k: f64,
    /// kg/mol
    pub molar_mass: f64,
    /// Pa/s
    pub dp_dt_upstream: f64,
    /// Pa/s
    pub dp_dt_downstream: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<GuardEvent>,
}

/// How a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Converged,
    TimedOut,
    Failed,
}

/// Summary indicators computed once from the full row sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    /// Largest |ṁ|, kg/s
    pub peak_flow_rate: f64,
    /// Pressure of the evolving vessel (downstream in both-evolve), Pa
    pub final_pressure: f64,
    /// Time of the last row, s
    pub equilibrium_time: f64,
    /// ∫|ṁ|dt by the trapezoid rule, kg
    pub total_mass_transferred: f64,
    /// True only when the run converged
    pub completed: bool,
    pub termination: Termination,
}

impl KpiSummary {
    pub fn from_rows(
        rows: &[SimulationRow],
        mode: OperatingMode,
        termination: Termination,
    ) -> Self {
        let peak_flow_rate = rows
            .iter()
            .map(|r| r.mass_flow_rate.abs())
            .fold(0.0, f64::max);

        let total_mass_transferred: f64 = rows
            .windows(2)
            .map(|w| {
                let mean = 0.5 * (w[0].mass_flow_rate.abs() + w[1].mass_flow_rate.abs());
                mean * (w[1].time - w[0].time)
            })
            .sum();

        let (final_pressure, equilibrium_time) = rows
            .last()
            .map(|last| {
                let p = match mode {
                    OperatingMode::ReceiverConstant => last.upstream_pressure,
                    OperatingMode::SupplyConstant | OperatingMode::BothEvolve => {
                        last.downstream_pressure
                    }
                };
                (p, last.time)
            })
            .unwrap_or((0.0, 0.0));

        Self {
            peak_flow_rate,
            final_pressure,
            equilibrium_time,
            total_mass_transferred,
            completed: termination == Termination::Converged,
            termination,
        }
    }
}

/// Message surface of a run: chunks, then exactly one terminal message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamMessage {
    Chunk {
        rows: Vec<SimulationRow>,
        total_rows: usize,
    },
    /// Last rows plus the summary of a run that converged or timed out.
    Complete {
        rows: Vec<SimulationRow>,
        total_rows: usize,
        #[serde(flatten)]
        kpi: KpiSummary,
    },
    /// Last rows plus the summary of a failed run.
    Error {
        rows: Vec<SimulationRow>,
        total_rows: usize,
        message: String,
        #[serde(flatten)]
        kpi: KpiSummary,
    },
    Cancelled {
        total_rows: usize,
    },
}

impl StreamMessage {
    pub fn rows(&self) -> &[SimulationRow] {
        match self {
            StreamMessage::Chunk { rows, .. }
            | StreamMessage::Complete { rows, .. }
            | StreamMessage::Error { rows, .. } => rows,
            StreamMessage::Cancelled { .. } => &[],
        }
    }

    pub fn total_rows(&self) -> usize {
        match self {
            StreamMessage::Chunk { total_rows, .. }
            | StreamMessage::Complete { total_rows, .. }
            | StreamMessage::Error { total_rows, .. }
            | StreamMessage::Cancelled { total_rows } => *total_rows,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamMessage::Chunk { .. })
    }
}
