//! vf-sim: transient valve flow between two vessels.
//!
//! Provides:
//! - `SimulationConfig` / `InitialConditions` with validation and defaults
//! - `VesselPair`: per-mode forward-Euler pressure update
//! - `SimulationDriver`: fixed-step loop emitting row batches, KPIs and a
//!   terminal message; cancellable between batches
//! - `SimulationWorker`: the driver on a background thread over a channel

pub mod cancel;
pub mod config;
pub mod driver;
pub mod error;
pub mod record;
pub mod vessel;
pub mod worker;

// Re-exports for public API
pub use cancel::CancelToken;
pub use config::{InitialConditions, OperatingMode, PropertySource, SimulationConfig, VesselSpec};
pub use driver::{DriverState, RunOutcome, RunStatus, SimulationDriver};
pub use error::{ConfigError, SimError, SimResult};
pub use record::{GuardEvent, KpiSummary, SimulationRow, StreamMessage, Termination};
pub use vessel::{PRESSURE_FLOOR_PA, VesselPair, VesselState, VesselUpdate};
pub use worker::SimulationWorker;
