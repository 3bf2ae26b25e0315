//! Peng-Robinson property provider for gas mixtures.
//!
//! Mixture parameters use van der Waals one-fluid mixing with zero binary
//! interaction, so `a_mix = (Σ x_i·√a_i)²` and `b_mix = Σ x_i·b_i`. The gas
//! root is the largest real root of the PR cubic in Z. Heat capacities are the
//! ideal-gas polynomial plus PR residual terms; k = Cp/Cv.

use std::f64::consts::SQRT_2;

use crate::composition::Composition;
use crate::error::{FluidError, FluidResult};
use crate::model::{GasProperties, PropertyProvider};
use vf_core::constants::R_UNIVERSAL;
use vf_core::units::{Pressure, Temperature};

/// State quantities resolved by one PR evaluation.
#[derive(Debug, Clone, Copy)]
pub struct PrState {
    pub z: f64,
    /// J/(mol·K)
    pub cp: f64,
    /// J/(mol·K)
    pub cv: f64,
}

/// Peng-Robinson equation of state with a bounded validity window.
#[derive(Debug, Clone)]
pub struct PengRobinson {
    pub t_min_k: f64,
    pub t_max_k: f64,
    pub p_min_pa: f64,
    pub p_max_pa: f64,
}

impl Default for PengRobinson {
    fn default() -> Self {
        Self {
            t_min_k: 50.0,
            t_max_k: 1500.0,
            p_min_pa: 1.0,
            p_max_pa: 1.0e8,
        }
    }
}

struct MixtureParams {
    a: f64,
    da_dt: f64,
    d2a_dt2: f64,
    b: f64,
    cp_ideal: f64,
}

impl PengRobinson {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_conditions(&self, p: f64, t: f64) -> FluidResult<()> {
        if !p.is_finite() || p < self.p_min_pa || p > self.p_max_pa {
            return Err(FluidError::Condition {
                what: "pressure",
                value: p,
            });
        }
        if !t.is_finite() || t < self.t_min_k || t > self.t_max_k {
            return Err(FluidError::Condition {
                what: "temperature",
                value: t,
            });
        }
        Ok(())
    }

    fn mixture(comp: &Composition, t: f64) -> MixtureParams {
        let r = R_UNIVERSAL;
        let mut s = 0.0;
        let mut ds = 0.0;
        let mut d2s = 0.0;
        let mut b = 0.0;
        let mut cp_ideal = 0.0;

        for (species, x) in comp.iter() {
            let d = species.data();
            let ac = 0.45724 * r * r * d.tc * d.tc / d.pc;
            let bi = 0.07780 * r * d.tc / d.pc;
            let m = 0.37464 + 1.54226 * d.omega - 0.26992 * d.omega * d.omega;

            let sqrt_ac = ac.sqrt();
            let sqrt_t_tc = (t * d.tc).sqrt();
            let sqrt_alpha = 1.0 + m * (1.0 - (t / d.tc).sqrt());

            // √a_i and its temperature derivatives
            s += x * sqrt_ac * sqrt_alpha;
            ds += x * (-sqrt_ac * m / (2.0 * sqrt_t_tc));
            d2s += x * (sqrt_ac * m / (4.0 * t * sqrt_t_tc));

            b += x * bi;
            cp_ideal += x * (d.cp[0] + d.cp[1] * t + d.cp[2] * t * t + d.cp[3] * t * t * t);
        }

        MixtureParams {
            a: s * s,
            da_dt: 2.0 * s * ds,
            d2a_dt2: 2.0 * (ds * ds + s * d2s),
            b,
            cp_ideal,
        }
    }

    /// Full PR evaluation at absolute pressure `p` (Pa) and temperature `t` (K).
    pub fn evaluate(&self, comp: &Composition, p: f64, t: f64) -> FluidResult<PrState> {
        self.check_conditions(p, t)?;
        if comp.is_empty() {
            return Err(FluidError::composition("empty composition"));
        }

        let r = R_UNIVERSAL;
        let mix = Self::mixture(comp, t);
        let big_a = mix.a * p / (r * t * r * t);
        let big_b = mix.b * p / (r * t);

        let z = gas_root(big_a, big_b).ok_or(FluidError::ConvergenceFailed {
            what: "Peng-Robinson gas root",
        })?;

        let v = z * r * t / p;
        let b = mix.b;
        let denom = v * v + 2.0 * b * v - b * b;
        let dp_dt_v = r / (v - b) - mix.da_dt / denom;
        let dp_dv_t = -r * t / ((v - b) * (v - b)) + 2.0 * mix.a * (v + b) / (denom * denom);
        if dp_dv_t.is_nan() || dp_dv_t >= 0.0 {
            return Err(FluidError::ConvergenceFailed {
                what: "mechanically unstable Peng-Robinson root",
            });
        }

        let log_term = ((z + (1.0 + SQRT_2) * big_b) / (z + (1.0 - SQRT_2) * big_b)).ln();
        let cv_residual = t * mix.d2a_dt2 / (2.0 * SQRT_2 * b) * log_term;
        let cv = mix.cp_ideal - r + cv_residual;
        let cp = cv - t * dp_dt_v * dp_dt_v / dp_dv_t;

        tracing::trace!(p, t, z, cp, cv, "peng-robinson state");

        Ok(PrState { z, cp, cv })
    }
}

impl PropertyProvider for PengRobinson {
    fn name(&self) -> &str {
        "peng-robinson"
    }

    fn properties(
        &self,
        composition: &Composition,
        pressure: Pressure,
        temperature: Temperature,
    ) -> FluidResult<GasProperties> {
        let state = self.evaluate(composition, pressure.value, temperature.value)?;
        if state.cv.is_nan() || state.cv <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "isochoric heat capacity",
                value: state.cv,
            });
        }
        GasProperties::new(state.z, state.cp / state.cv, composition.molar_mass())
    }
}

/// Largest real root of Z³ − (1−B)Z² + (A − 3B² − 2B)Z − (AB − B² − B³) = 0,
/// provided it lies above the co-volume B.
fn gas_root(a: f64, b: f64) -> Option<f64> {
    let c2 = -(1.0 - b);
    let c1 = a - 3.0 * b * b - 2.0 * b;
    let c0 = -(a * b - b * b - b * b * b);

    // Depressed cubic y³ + p·y + q = 0 with Z = y − c2/3
    let p = c1 - c2 * c2 / 3.0;
    let q = 2.0 * c2 * c2 * c2 / 27.0 - c2 * c1 / 3.0 + c0;
    let disc = (q / 2.0).powi(2) + (p / 3.0).powi(3);

    let y = if disc > 0.0 || p >= 0.0 {
        let sd = disc.max(0.0).sqrt();
        (-q / 2.0 + sd).cbrt() + (-q / 2.0 - sd).cbrt()
    } else {
        let r = 2.0 * (-p / 3.0).sqrt();
        let arg = (3.0 * q / (2.0 * p) * (-3.0 / p).sqrt()).clamp(-1.0, 1.0);
        let phi = arg.acos() / 3.0;
        // first trigonometric branch is the largest of the three real roots
        r * phi.cos()
    };

    let mut z = y - c2 / 3.0;
    // Newton polish
    for _ in 0..3 {
        let f = ((z + c2) * z + c1) * z + c0;
        let df = (3.0 * z + 2.0 * c2) * z + c1;
        if df.abs() < 1e-300 {
            break;
        }
        z -= f / df;
    }

    (z.is_finite() && z > b).then_some(z)
}
