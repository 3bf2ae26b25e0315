//! Error type for the command-line front end.

use std::path::PathBuf;

use vf_fluids::FluidError;
use vf_sim::SimError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read scenario file: {path}")]
    ScenarioRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse scenario: {0}")]
    ScenarioParse(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error(transparent)]
    Fluid(#[from] FluidError),

    #[error("Unknown preset '{0}' (see `vf-cli presets`)")]
    UnknownPreset(String),

    #[error("Simulation failed: {0}")]
    RunFailed(String),

    #[error("Simulation was cancelled after {0} rows")]
    Cancelled(usize),

    #[error("Simulation worker stopped unexpectedly")]
    WorkerPanicked,
}

pub type CliResult<T> = Result<T, CliError>;
