//! Fluid property errors.

use thiserror::Error;
use vf_core::VfError;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur during fluid property calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Composition is unusable (unknown species, fractions not summing to one, ...).
    #[error("Invalid composition: {reason}")]
    Composition { reason: String },

    /// Pressure or temperature outside the correlation's valid range.
    #[error("Condition out of range for {what}: {value}")]
    Condition { what: &'static str, value: f64 },

    /// Property values that cannot describe a gas (Z <= 0, k <= 1, M <= 0).
    #[error("Non-physical value for {what}: {value}")]
    NonPhysical { what: &'static str, value: f64 },

    /// Equation-of-state solve failed.
    #[error("Convergence failed for {what}")]
    ConvergenceFailed { what: &'static str },
}

impl FluidError {
    pub(crate) fn composition(reason: impl Into<String>) -> Self {
        FluidError::Composition {
            reason: reason.into(),
        }
    }
}

impl From<VfError> for FluidError {
    fn from(err: VfError) -> Self {
        match err {
            VfError::NonFinite { what, value } | VfError::OutOfRange { what, value } => {
                FluidError::Condition { what, value }
            }
            VfError::InvalidArg { what } => FluidError::Condition {
                what,
                value: f64::NAN,
            },
        }
    }
}
