//! Run configuration and initial vessel conditions.
//!
//! All values are SI absolute (Pa, K, m³, m², s). Engineering units are
//! converted before a config reaches this crate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SimResult};
use vf_components::valve::MAX_CURVE_FACTOR;
use vf_components::{FlowRegimeCalculator, OpeningProfile, ValveAction, ValveProfile};
use vf_core::units::m2;
use vf_fluids::{AIR_MOLAR_MASS, Composition, FluidResult, GasProperties, Preset};

pub const DEFAULT_DISCHARGE_COEFFICIENT: f64 = 0.65;
pub const DEFAULT_CURVE_FACTOR: f64 = 4.0;
pub const DEFAULT_TIME_STEP: f64 = 0.05;
pub const DEFAULT_BATCH_SIZE: usize = 5;
/// Run length for a fixed-instant valve when none is given, s.
pub const DEFAULT_INSTANT_MAX_TIME: f64 = 3600.0;

/// Which vessel(s) evolve and which are held as boundary conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperatingMode {
    /// Upstream fixed, downstream fills.
    #[serde(alias = "pressurize")]
    SupplyConstant,
    /// Downstream fixed, upstream drains.
    #[serde(alias = "depressurize")]
    ReceiverConstant,
    /// Both vessels finite and closed.
    #[default]
    #[serde(alias = "equalize")]
    BothEvolve,
}

impl OperatingMode {
    pub fn upstream_evolves(&self) -> bool {
        matches!(self, OperatingMode::ReceiverConstant | OperatingMode::BothEvolve)
    }

    pub fn downstream_evolves(&self) -> bool {
        matches!(self, OperatingMode::SupplyConstant | OperatingMode::BothEvolve)
    }

    pub fn label(&self) -> &'static str {
        match self {
            OperatingMode::SupplyConstant => "supply-constant",
            OperatingMode::ReceiverConstant => "receiver-constant",
            OperatingMode::BothEvolve => "both-evolve",
        }
    }
}

fn default_z() -> f64 {
    1.0
}

fn default_k() -> f64 {
    1.4
}

fn default_molar_mass() -> f64 {
    AIR_MOLAR_MASS
}

/// Where Z, k and M come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum PropertySource {
    /// Constant properties. The provider is never called.
    Manual {
        #[serde(default = "default_z")]
        z: f64,
        #[serde(default = "default_k")]
        k: f64,
        /// kg/mol
        #[serde(default = "default_molar_mass")]
        molar_mass: f64,
    },
    /// Mole fractions by species name, evaluated by the property provider.
    Composition { composition: BTreeMap<String, f64> },
    /// A named preset mixture, evaluated by the property provider.
    Preset { preset: Preset },
}

impl Default for PropertySource {
    fn default() -> Self {
        PropertySource::Manual {
            z: default_z(),
            k: default_k(),
            molar_mass: default_molar_mass(),
        }
    }
}

impl PropertySource {
    /// Composition to hand to the provider, `None` for manual properties.
    pub fn composition(&self) -> FluidResult<Option<Composition>> {
        match self {
            PropertySource::Manual { .. } => Ok(None),
            PropertySource::Composition { composition } => {
                Composition::try_from(composition.clone()).map(Some)
            }
            PropertySource::Preset { preset } => preset.composition().map(Some),
        }
    }

    pub fn manual_properties(&self) -> Option<GasProperties> {
        match *self {
            PropertySource::Manual { z, k, molar_mass } => Some(GasProperties { z, k, molar_mass }),
            _ => None,
        }
    }
}

fn default_cd() -> f64 {
    DEFAULT_DISCHARGE_COEFFICIENT
}

fn default_curve_factor() -> f64 {
    DEFAULT_CURVE_FACTOR
}

fn default_time_step() -> f64 {
    DEFAULT_TIME_STEP
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

/// Immutable description of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub mode: OperatingMode,
    #[serde(default)]
    pub valve_action: ValveAction,
    #[serde(default)]
    pub opening_profile: OpeningProfile,
    /// Valve travel time, s. Required unless fixed-instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_time: Option<f64>,
    /// Shape factor for exponential and quick-acting curves.
    #[serde(default = "default_curve_factor")]
    pub curve_factor: f64,
    /// Fully open flow area, m².
    pub valve_bore_area: f64,
    #[serde(default = "default_cd")]
    pub discharge_coefficient: f64,
    /// Fixed integration step, s.
    #[serde(default = "default_time_step")]
    pub time_step: f64,
    /// Hard stop, s. Derived from the valve profile when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_simulation_time: Option<f64>,
    /// Rows per streamed chunk.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub properties: PropertySource,
}

impl SimulationConfig {
    /// Config with every default applied and the given bore area (m²).
    pub fn new(valve_bore_area: f64) -> Self {
        Self {
            mode: OperatingMode::default(),
            valve_action: ValveAction::default(),
            opening_profile: OpeningProfile::default(),
            opening_time: None,
            curve_factor: DEFAULT_CURVE_FACTOR,
            valve_bore_area,
            discharge_coefficient: DEFAULT_DISCHARGE_COEFFICIENT,
            time_step: DEFAULT_TIME_STEP,
            max_simulation_time: None,
            batch_size: DEFAULT_BATCH_SIZE,
            properties: PropertySource::default(),
        }
    }

    /// Travel time the profile will use, s. Zero for fixed-instant.
    pub fn travel_time(&self) -> f64 {
        match self.opening_profile {
            OpeningProfile::FixedInstant => 0.0,
            _ => self.opening_time.unwrap_or(0.0),
        }
    }

    /// Explicit max time, or 3600 s for fixed-instant, 1.2× travel when
    /// closing and 10× travel when opening.
    pub fn effective_max_time(&self) -> f64 {
        if let Some(t) = self.max_simulation_time {
            return t;
        }
        if self.opening_profile == OpeningProfile::FixedInstant {
            return DEFAULT_INSTANT_MAX_TIME;
        }
        match self.valve_action {
            ValveAction::Closing => 1.2 * self.travel_time(),
            ValveAction::Opening => 10.0 * self.travel_time(),
        }
    }

    /// Check every rule once, before the run starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fixed = self.opening_profile == OpeningProfile::FixedInstant;
        if fixed && self.valve_action == ValveAction::Closing {
            return Err(ConfigError::InstantClosing);
        }
        if !fixed {
            let Some(opening_time) = self.opening_time else {
                return Err(ConfigError::MissingOpeningTime {
                    profile: profile_label(self.opening_profile),
                });
            };
            positive("opening_time", opening_time)?;
        }
        if self.opening_profile.is_curved()
            && !(self.curve_factor > 0.0 && self.curve_factor <= MAX_CURVE_FACTOR)
        {
            return Err(ConfigError::CurveFactor {
                value: self.curve_factor,
                max: MAX_CURVE_FACTOR,
            });
        }
        positive("valve_bore_area", self.valve_bore_area)?;
        let cd = self.discharge_coefficient;
        if cd.is_nan() || cd <= 0.0 || cd > 1.0 {
            return Err(ConfigError::DischargeCoefficient(cd));
        }
        positive("time_step", self.time_step)?;
        let max_time = self.effective_max_time();
        positive("max_simulation_time", max_time)?;
        if max_time <= self.time_step {
            return Err(ConfigError::MaxTimeTooShort {
                max_time,
                time_step: self.time_step,
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::BatchSize);
        }
        if let Some(props) = self.properties.manual_properties() {
            props.validate().map_err(ConfigError::ManualProperties)?;
        }
        Ok(())
    }

    /// Opening curve for this config.
    pub fn valve_profile(&self) -> SimResult<ValveProfile> {
        Ok(ValveProfile::new(
            self.valve_action,
            self.opening_profile,
            self.travel_time(),
            self.curve_factor,
        )?)
    }

    /// Orifice calculator for this config.
    pub fn flow_calculator(&self) -> SimResult<FlowRegimeCalculator> {
        Ok(FlowRegimeCalculator::new(
            self.discharge_coefficient,
            m2(self.valve_bore_area),
        )?)
    }
}

fn profile_label(profile: OpeningProfile) -> &'static str {
    match profile {
        OpeningProfile::Linear => "linear",
        OpeningProfile::Exponential => "exponential",
        OpeningProfile::QuickActing => "quick-acting",
        OpeningProfile::FixedInstant => "fixed-instant",
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

/// Starting state of one vessel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VesselSpec {
    /// Absolute pressure, Pa.
    pub pressure: f64,
    /// Absolute temperature, K.
    pub temperature: f64,
    /// Volume, m³.
    pub volume: f64,
}

impl VesselSpec {
    fn validate(&self, vessel: &'static str) -> Result<(), ConfigError> {
        for (field, value) in [
            ("pressure", self.pressure),
            ("temperature", self.temperature),
            ("volume", self.volume),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Vessel {
                    vessel,
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialConditions {
    pub upstream: VesselSpec,
    pub downstream: VesselSpec,
}

impl InitialConditions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.upstream.validate("upstream")?;
        self.downstream.validate("downstream")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(opening_time: f64) -> SimulationConfig {
        SimulationConfig {
            opening_time: Some(opening_time),
            ..SimulationConfig::new(5e-4)
        }
    }

    #[test]
    fn defaults_from_yaml() {
        let cfg: SimulationConfig =
            serde_yaml::from_str("valve_bore_area: 0.0005\nopening_time: 5.0\n").unwrap();
        assert_eq!(cfg.mode, OperatingMode::BothEvolve);
        assert_eq!(cfg.valve_action, ValveAction::Opening);
        assert_eq!(cfg.opening_profile, OpeningProfile::Linear);
        assert_eq!(cfg.discharge_coefficient, 0.65);
        assert_eq!(cfg.curve_factor, 4.0);
        assert_eq!(cfg.time_step, 0.05);
        assert_eq!(cfg.batch_size, 5);
        assert_eq!(cfg.properties, PropertySource::default());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn mode_aliases() {
        let mode: OperatingMode = serde_yaml::from_str("pressurize").unwrap();
        assert_eq!(mode, OperatingMode::SupplyConstant);
        let mode: OperatingMode = serde_yaml::from_str("depressurize").unwrap();
        assert_eq!(mode, OperatingMode::ReceiverConstant);
        let mode: OperatingMode = serde_yaml::from_str("equalize").unwrap();
        assert_eq!(mode, OperatingMode::BothEvolve);
        let mode: OperatingMode = serde_yaml::from_str("supply-constant").unwrap();
        assert_eq!(mode, OperatingMode::SupplyConstant);
    }

    #[test]
    fn property_source_forms() {
        let src: PropertySource =
            serde_yaml::from_str("source: composition\ncomposition:\n  Methane: 0.9\n  Ethane: 0.1\n")
                .unwrap();
        assert!(src.composition().unwrap().is_some());

        let src: PropertySource = serde_yaml::from_str("source: preset\npreset: lean_gas\n").unwrap();
        assert!(src.composition().unwrap().is_some());

        let src: PropertySource = serde_yaml::from_str("source: manual\nk: 1.3\n").unwrap();
        let props = src.manual_properties().unwrap();
        assert_eq!((props.z, props.k), (1.0, 1.3));
    }

    #[test]
    fn max_time_defaults() {
        assert_eq!(linear(5.0).effective_max_time(), 50.0);

        let closing = SimulationConfig {
            valve_action: ValveAction::Closing,
            ..linear(5.0)
        };
        assert!((closing.effective_max_time() - 6.0).abs() < 1e-12);

        let instant = SimulationConfig {
            opening_profile: OpeningProfile::FixedInstant,
            ..SimulationConfig::new(5e-4)
        };
        assert_eq!(instant.effective_max_time(), 3600.0);
        assert!(instant.validate().is_ok());
    }

    #[test]
    fn validation_rules() {
        let instant_close = SimulationConfig {
            valve_action: ValveAction::Closing,
            opening_profile: OpeningProfile::FixedInstant,
            ..SimulationConfig::new(5e-4)
        };
        assert_eq!(instant_close.validate(), Err(ConfigError::InstantClosing));

        assert!(matches!(
            SimulationConfig::new(5e-4).validate(),
            Err(ConfigError::MissingOpeningTime { profile: "linear" })
        ));

        let bad_cd = SimulationConfig {
            discharge_coefficient: 1.5,
            ..linear(5.0)
        };
        assert_eq!(bad_cd.validate(), Err(ConfigError::DischargeCoefficient(1.5)));

        let bad_dt = SimulationConfig {
            time_step: 0.0,
            ..linear(5.0)
        };
        assert!(matches!(
            bad_dt.validate(),
            Err(ConfigError::NonPositive { field: "time_step", .. })
        ));

        let short = SimulationConfig {
            max_simulation_time: Some(0.01),
            ..linear(5.0)
        };
        assert!(matches!(short.validate(), Err(ConfigError::MaxTimeTooShort { .. })));

        let curved = SimulationConfig {
            opening_profile: OpeningProfile::Exponential,
            curve_factor: 0.0,
            ..linear(5.0)
        };
        assert!(matches!(curved.validate(), Err(ConfigError::CurveFactor { .. })));

        let bad_props = SimulationConfig {
            properties: PropertySource::Manual {
                z: 1.0,
                k: 0.8,
                molar_mass: 0.029,
            },
            ..linear(5.0)
        };
        assert!(matches!(bad_props.validate(), Err(ConfigError::ManualProperties(_))));

        let no_batch = SimulationConfig {
            batch_size: 0,
            ..linear(5.0)
        };
        assert_eq!(no_batch.validate(), Err(ConfigError::BatchSize));
    }

    #[test]
    fn vessel_validation() {
        let vessel = VesselSpec {
            pressure: 1e5,
            temperature: 300.0,
            volume: 1.0,
        };
        let ok = InitialConditions {
            upstream: vessel,
            downstream: vessel,
        };
        assert!(ok.validate().is_ok());

        let bad = InitialConditions {
            downstream: VesselSpec {
                volume: 0.0,
                ..vessel
            },
            ..ok
        };
        assert!(matches!(
            bad.validate(),
            Err(ConfigError::Vessel {
                vessel: "downstream",
                field: "volume",
                ..
            })
        ));
    }
}
