//! Error types for simulation operations.

use thiserror::Error;
use vf_components::ComponentError;
use vf_fluids::FluidError;

/// Rejected run configuration. Raised before any step runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("fixed-instant profile cannot be combined with a closing valve")]
    InstantClosing,

    #[error("opening_time is required for the {profile} profile")]
    MissingOpeningTime { profile: &'static str },

    #[error("{field} must be finite and positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("discharge_coefficient must lie in (0, 1], got {0}")]
    DischargeCoefficient(f64),

    #[error("curve_factor must lie in (0, {max}], got {value}")]
    CurveFactor { value: f64, max: f64 },

    #[error("max_simulation_time ({max_time} s) must exceed time_step ({time_step} s)")]
    MaxTimeTooShort { max_time: f64, time_step: f64 },

    #[error("batch_size must be at least 1")]
    BatchSize,

    #[error("{vessel} vessel: {field} must be finite and positive, got {value}")]
    Vessel {
        vessel: &'static str,
        field: &'static str,
        value: f64,
    },

    #[error("manual gas properties rejected: {0}")]
    ManualProperties(FluidError),
}

/// Errors encountered during a simulation run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Provider rejected the composition or conditions, or returned a
    /// non-physical property set.
    #[error("Property error: {0}")]
    Property(#[from] FluidError),

    #[error("Component error: {0}")]
    Component(ComponentError),
}

pub type SimResult<T> = Result<T, SimError>;

impl From<ComponentError> for SimError {
    fn from(e: ComponentError) -> Self {
        match e {
            ComponentError::Property(fluid) => SimError::Property(fluid),
            other => SimError::Component(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_errors_surface_as_property() {
        let err: SimError = ComponentError::Property(FluidError::NonPhysical {
            what: "compressibility factor",
            value: -1.0,
        })
        .into();
        assert!(matches!(err, SimError::Property(_)));

        let err: SimError = ComponentError::NonPhysical {
            what: "upstream pressure",
        }
        .into();
        assert!(matches!(err, SimError::Component(_)));
    }

    #[test]
    fn config_error_display() {
        let err = SimError::from(ConfigError::MaxTimeTooShort {
            max_time: 0.01,
            time_step: 0.05,
        });
        let text = err.to_string();
        assert!(text.contains("max_simulation_time"), "{text}");
    }
}
