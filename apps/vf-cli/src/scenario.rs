//! Scenario files in engineering units.
//!
//! A scenario is what an operator writes: gauge pressures in psig,
//! temperatures in °F, volumes in ft³ and the valve inner diameter in
//! inches. [`Scenario::to_run`] converts it into the SI absolute
//! configuration the simulation core works in.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};
use vf_components::{OpeningProfile, ValveAction};
use vf_core::units::eng;
use vf_sim::{InitialConditions, OperatingMode, PropertySource, SimulationConfig, VesselSpec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub mode: OperatingMode,
    pub valve: ValveInput,
    pub upstream: VesselInput,
    pub downstream: VesselInput,
    #[serde(default)]
    pub gas: PropertySource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_step_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_time_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValveInput {
    #[serde(default)]
    pub action: ValveAction,
    #[serde(default)]
    pub profile: OpeningProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_time_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve_factor: Option<f64>,
    pub inner_diameter_in: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discharge_coefficient: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VesselInput {
    pub pressure_psig: f64,
    pub temperature_f: f64,
    pub volume_ft3: f64,
}

impl VesselInput {
    fn to_spec(self) -> VesselSpec {
        VesselSpec {
            pressure: eng::psig_to_pa(self.pressure_psig),
            temperature: eng::fahrenheit_to_kelvin(self.temperature_f),
            volume: eng::ft3_to_m3(self.volume_ft3),
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::ScenarioRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> CliResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// SI configuration and initial vessel states. Unset fields keep the
    /// simulation defaults.
    pub fn to_run(&self) -> (SimulationConfig, InitialConditions) {
        let mut config = SimulationConfig::new(eng::bore_area_from_inch(self.valve.inner_diameter_in));
        config.mode = self.mode;
        config.valve_action = self.valve.action;
        config.opening_profile = self.valve.profile;
        config.opening_time = self.valve.opening_time_s;
        config.max_simulation_time = self.max_time_s;
        config.properties = self.gas.clone();
        if let Some(cf) = self.valve.curve_factor {
            config.curve_factor = cf;
        }
        if let Some(cd) = self.valve.discharge_coefficient {
            config.discharge_coefficient = cd;
        }
        if let Some(dt) = self.time_step_s {
            config.time_step = dt;
        }
        if let Some(n) = self.batch_size {
            config.batch_size = n;
        }

        let initial = InitialConditions {
            upstream: self.upstream.to_spec(),
            downstream: self.downstream.to_spec(),
        };
        (config, initial)
    }
}
