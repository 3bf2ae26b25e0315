//! Common utilities for component calculations.

use crate::error::{ComponentError, ComponentResult};
use vf_core::numeric::{ensure_finite, ensure_positive};

/// Pressure band (Pa) inside which two vessels count as equalized.
pub const EPSILON_PRESSURE: f64 = 1.0;

/// Ensure a value is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<()> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })?;
    Ok(())
}

/// Ensure a value is finite and strictly positive.
pub fn check_positive(value: f64, what: &'static str) -> ComponentResult<()> {
    ensure_positive(value, what)?;
    Ok(())
}
