//! Error types for component operations.

use thiserror::Error;
use vf_core::error::VfError;
use vf_fluids::FluidError;

/// Errors that can occur during component calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Gas properties handed to a component are unusable.
    #[error("Property error: {0}")]
    Property(#[from] FluidError),
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<VfError> for ComponentError {
    fn from(e: VfError) -> Self {
        match e {
            VfError::NonFinite { what, .. } | VfError::OutOfRange { what, .. } => {
                ComponentError::NonPhysical { what }
            }
            VfError::InvalidArg { what } => ComponentError::InvalidArg { what },
        }
    }
}
