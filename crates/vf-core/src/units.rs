// vf-core/src/units.rs

use uom::si::f64::{
    Area as UomArea, MassRate as UomMassRate, MolarMass as UomMolarMass,
    Pressure as UomPressure, Ratio as UomRatio,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
    Volume as UomVolume,
};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type MassRate = UomMassRate;
pub type MolarMass = UomMolarMass;
pub type Pressure = UomPressure;
pub type Ratio = UomRatio;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;
pub type Volume = UomVolume;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn kgps(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

#[inline]
pub fn kg_per_mol(v: f64) -> MolarMass {
    use uom::si::molar_mass::kilogram_per_mole;
    MolarMass::new::<kilogram_per_mole>(v)
}

#[inline]
pub fn m2(v: f64) -> Area {
    use uom::si::area::square_meter;
    Area::new::<square_meter>(v)
}

#[inline]
pub fn m3(v: f64) -> Volume {
    use uom::si::volume::cubic_meter;
    Volume::new::<cubic_meter>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

pub mod constants {
    /// Universal gas constant, J/(mol·K).
    pub const R_UNIVERSAL: f64 = 8.31446;

    /// Standard atmosphere, psi.
    pub const ATM_PSI: f64 = 14.696;
}

/// Conversions between engineering display units and SI.
///
/// The simulation core only ever sees SI absolute values; these helpers live
/// at the request/response boundary.
pub mod eng {
    use super::constants::ATM_PSI;

    pub const PSI_TO_PA: f64 = 6894.76;
    pub const INCH_TO_M: f64 = 0.0254;
    pub const FT3_TO_M3: f64 = 0.0283168;
    pub const KG_S_TO_LB_HR: f64 = 7936.64;
    pub const KG_TO_LB: f64 = 2.20462;

    #[inline]
    pub fn psig_to_pa(psig: f64) -> f64 {
        (psig + ATM_PSI) * PSI_TO_PA
    }

    #[inline]
    pub fn pa_to_psig(pa: f64) -> f64 {
        pa / PSI_TO_PA - ATM_PSI
    }

    #[inline]
    pub fn psia_to_pa(psia: f64) -> f64 {
        psia * PSI_TO_PA
    }

    #[inline]
    pub fn fahrenheit_to_kelvin(f: f64) -> f64 {
        (f - 32.0) * 5.0 / 9.0 + 273.15
    }

    #[inline]
    pub fn kelvin_to_fahrenheit(k: f64) -> f64 {
        (k - 273.15) * 9.0 / 5.0 + 32.0
    }

    #[inline]
    pub fn ft3_to_m3(ft3: f64) -> f64 {
        ft3 * FT3_TO_M3
    }

    #[inline]
    pub fn inch_to_m(inch: f64) -> f64 {
        inch * INCH_TO_M
    }

    #[inline]
    pub fn kgps_to_lb_per_hr(kgps: f64) -> f64 {
        kgps * KG_S_TO_LB_HR
    }

    #[inline]
    pub fn kg_to_lb(kg: f64) -> f64 {
        kg * KG_TO_LB
    }

    /// Circular bore area (m²) from an inner diameter in inches.
    pub fn bore_area_from_inch(diameter_inch: f64) -> f64 {
        let d = inch_to_m(diameter_inch);
        std::f64::consts::PI * d * d / 4.0
    }
}
