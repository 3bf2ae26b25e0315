//! Real-gas orifice flow with choking.
//!
//! Flow always runs from the higher to the lower pressure. The source (upstream)
//! vessel's Z, k and M drive the correlation:
//!
//! - choked, `r ≤ r_c`:
//!   `ṁ = Cd·A·P_up·√( k·M/(Z·R·T) · (2/(k+1))^((k+1)/(k−1)) )`
//! - subsonic, `r > r_c`:
//!   `ṁ = Cd·A·P_up·√( 2M/(Z·R·T) · k/(k−1) · [r^(2/k) − r^((k+1)/k)] )`
//!
//! with `r = P_down/P_up` and `r_c = (2/(k+1))^(k/(k−1))`. Both branches meet
//! at `r_c`, so the rate is continuous across the regime switch.

use serde::{Deserialize, Serialize};

use crate::common::{EPSILON_PRESSURE, check_finite, check_positive};
use crate::error::{ComponentError, ComponentResult};
use vf_core::constants::R_UNIVERSAL;
use vf_core::units::{Area, MassRate, Pressure, Temperature, kgps};
use vf_fluids::GasProperties;

/// Flow classification for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowRegime {
    /// No flow: valve shut, reversed pressure difference or a clamped vessel.
    #[default]
    None,
    /// Pressures equal within [`EPSILON_PRESSURE`].
    Equilibrium,
    Choked,
    Subsonic,
}

impl FlowRegime {
    pub fn label(&self) -> &'static str {
        match self {
            FlowRegime::None => "none",
            FlowRegime::Equilibrium => "equilibrium",
            FlowRegime::Choked => "choked",
            FlowRegime::Subsonic => "subsonic",
        }
    }
}

impl std::fmt::Display for FlowRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of one flow evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowSolution {
    /// Mass flow from upstream to downstream, never negative.
    pub mass_flow: MassRate,
    pub regime: FlowRegime,
    /// The subsonic bracket rounded below zero and was clamped.
    pub bracket_clamped: bool,
}

impl FlowSolution {
    fn no_flow(regime: FlowRegime) -> Self {
        Self {
            mass_flow: kgps(0.0),
            regime,
            bracket_clamped: false,
        }
    }
}

/// Downstream/upstream pressure ratio at which the flow chokes.
pub fn critical_pressure_ratio(k: f64) -> f64 {
    (2.0 / (k + 1.0)).powf(k / (k - 1.0))
}

/// Orifice mass flow through an effective area (SI values).
///
/// `area_eff` is the bore area already scaled by the opening fraction.
pub fn mass_flow(
    cd: f64,
    area_eff: f64,
    p_up: f64,
    p_down: f64,
    t_up: f64,
    props: &GasProperties,
) -> ComponentResult<FlowSolution> {
    props.validate()?;
    check_positive(p_up, "upstream pressure")?;
    check_positive(p_down, "downstream pressure")?;
    check_positive(t_up, "upstream temperature")?;
    check_finite(area_eff, "effective area")?;

    if area_eff <= 0.0 {
        return Ok(FlowSolution::no_flow(FlowRegime::None));
    }
    if (p_up - p_down).abs() < EPSILON_PRESSURE {
        return Ok(FlowSolution::no_flow(FlowRegime::Equilibrium));
    }
    if p_down > p_up {
        return Ok(FlowSolution::no_flow(FlowRegime::None));
    }

    let GasProperties { z, k, molar_mass } = *props;
    let r = p_down / p_up;
    let r_c = critical_pressure_ratio(k);
    let zrt = z * R_UNIVERSAL * t_up;

    let (radicand, regime, bracket_clamped) = if r <= r_c {
        let choke = (2.0 / (k + 1.0)).powf((k + 1.0) / (k - 1.0));
        (k * molar_mass / zrt * choke, FlowRegime::Choked, false)
    } else {
        let bracket = r.powf(2.0 / k) - r.powf((k + 1.0) / k);
        let clamped = bracket < 0.0;
        let radicand = 2.0 * molar_mass / zrt * k / (k - 1.0) * bracket.max(0.0);
        (radicand, FlowRegime::Subsonic, clamped)
    };

    let mdot = cd * area_eff * p_up * radicand.sqrt();
    check_finite(mdot, "mass flow rate")?;

    Ok(FlowSolution {
        mass_flow: kgps(mdot),
        regime,
        bracket_clamped,
    })
}

/// Valve bore plus discharge coefficient; evaluates flow at a given opening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowRegimeCalculator {
    /// Discharge coefficient, in (0, 1]
    pub discharge_coefficient: f64,
    /// Fully open flow area
    pub bore_area: Area,
}

impl FlowRegimeCalculator {
    pub fn new(discharge_coefficient: f64, bore_area: Area) -> ComponentResult<Self> {
        check_positive(discharge_coefficient, "discharge coefficient")?;
        if discharge_coefficient > 1.0 {
            return Err(ComponentError::InvalidArg {
                what: "discharge coefficient above 1",
            });
        }
        check_positive(bore_area.value, "bore area")?;
        Ok(Self {
            discharge_coefficient,
            bore_area,
        })
    }

    /// Flow at `opening_fraction` of the bore.
    ///
    /// A fully shut valve returns exactly zero flow without touching the
    /// correlation.
    pub fn evaluate(
        &self,
        p_up: Pressure,
        p_down: Pressure,
        t_up: Temperature,
        props: &GasProperties,
        opening_fraction: f64,
    ) -> ComponentResult<FlowSolution> {
        check_finite(opening_fraction, "opening fraction")?;
        let area_eff = self.bore_area.value * opening_fraction.clamp(0.0, 1.0);
        mass_flow(
            self.discharge_coefficient,
            area_eff,
            p_up.value,
            p_down.value,
            t_up.value,
            props,
        )
    }
}
