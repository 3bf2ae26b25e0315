//! Gas property snapshot and the provider trait.

use serde::{Deserialize, Serialize};

use crate::composition::Composition;
use crate::error::{FluidError, FluidResult};
use vf_core::units::{Pressure, Temperature};

/// Molar mass of dry air, kg/mol.
pub const AIR_MOLAR_MASS: f64 = 0.02897;

/// Real-gas properties at one (P, T) state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasProperties {
    /// Compressibility factor Z (dimensionless, > 0)
    pub z: f64,
    /// Heat capacity ratio k = Cp/Cv (dimensionless, > 1)
    pub k: f64,
    /// Molar mass M, kg/mol (> 0)
    pub molar_mass: f64,
}

impl GasProperties {
    /// Create a validated property set.
    pub fn new(z: f64, k: f64, molar_mass: f64) -> FluidResult<Self> {
        let props = Self { z, k, molar_mass };
        props.validate()?;
        Ok(props)
    }

    /// Ideal air: Z = 1, k = 1.4, M = 28.97 g/mol.
    pub fn ideal_air() -> Self {
        Self {
            z: 1.0,
            k: 1.4,
            molar_mass: AIR_MOLAR_MASS,
        }
    }

    /// Reject sets that cannot describe a gas.
    pub fn validate(&self) -> FluidResult<()> {
        if !(self.z.is_finite() && self.z > 0.0) {
            return Err(FluidError::NonPhysical {
                what: "compressibility factor",
                value: self.z,
            });
        }
        if !(self.k.is_finite() && self.k > 1.0) {
            return Err(FluidError::NonPhysical {
                what: "heat capacity ratio",
                value: self.k,
            });
        }
        if !(self.molar_mass.is_finite() && self.molar_mass > 0.0) {
            return Err(FluidError::NonPhysical {
                what: "molar mass",
                value: self.molar_mass,
            });
        }
        Ok(())
    }
}

impl Default for GasProperties {
    fn default() -> Self {
        Self::ideal_air()
    }
}

/// Source of (Z, k, M) for a composition at given conditions.
///
/// Implementations must be thread-safe (Send + Sync) so that a run can be
/// moved onto a worker thread. A provider may be slow; bounding its latency
/// is the provider's concern.
pub trait PropertyProvider: Send + Sync {
    /// Get the provider name (for logging).
    fn name(&self) -> &str;

    /// Evaluate properties of `composition` at absolute pressure and temperature.
    ///
    /// Fails with [`FluidError::Composition`] for unusable compositions and
    /// [`FluidError::Condition`] when (P, T) is outside the valid range.
    fn properties(
        &self,
        composition: &Composition,
        pressure: Pressure,
        temperature: Temperature,
    ) -> FluidResult<GasProperties>;
}
