//! Valve opening profiles.
//!
//! A [`ValveProfile`] maps elapsed time to an opening fraction in [0, 1]. The
//! curve runs over `opening_time` and is pinned at its terminal value
//! afterwards (1 when opening, 0 when closing).

use serde::{Deserialize, Serialize};

use crate::common::check_positive;
use crate::error::{ComponentError, ComponentResult};

/// Largest accepted curve factor.
pub const MAX_CURVE_FACTOR: f64 = 100.0;

/// Direction of valve travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValveAction {
    #[default]
    Opening,
    Closing,
}

/// Shape of the opening curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpeningProfile {
    /// f = t / T
    #[default]
    Linear,
    /// Slow start: f = (e^(c·t/T) − 1) / (e^c − 1)
    Exponential,
    /// Fast start: f = (1 − e^(−c·t/T)) / (1 − e^(−c))
    QuickActing,
    /// Fully open from t = 0, no ramp.
    FixedInstant,
}

impl OpeningProfile {
    /// Whether the profile uses `curve_factor`.
    pub fn is_curved(&self) -> bool {
        matches!(self, OpeningProfile::Exponential | OpeningProfile::QuickActing)
    }
}

/// Validated valve motion: action, curve shape and timing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValveProfile {
    action: ValveAction,
    profile: OpeningProfile,
    /// Travel time, s. Zero for fixed-instant.
    opening_time: f64,
    curve_factor: f64,
}

impl ValveProfile {
    /// Create a profile.
    ///
    /// `opening_time` is ignored for fixed-instant and must be positive
    /// otherwise. `curve_factor` must lie in (0, [`MAX_CURVE_FACTOR`]] for the
    /// curved profiles. An instantaneous closing is rejected.
    pub fn new(
        action: ValveAction,
        profile: OpeningProfile,
        opening_time: f64,
        curve_factor: f64,
    ) -> ComponentResult<Self> {
        if profile == OpeningProfile::FixedInstant {
            if action == ValveAction::Closing {
                return Err(ComponentError::InvalidArg {
                    what: "fixed-instant profile cannot model a closing valve",
                });
            }
            return Ok(Self {
                action,
                profile,
                opening_time: 0.0,
                curve_factor,
            });
        }

        check_positive(opening_time, "opening time")?;
        if profile.is_curved() {
            check_positive(curve_factor, "curve factor")?;
            if curve_factor > MAX_CURVE_FACTOR {
                return Err(ComponentError::InvalidArg {
                    what: "curve factor too large",
                });
            }
        }

        Ok(Self {
            action,
            profile,
            opening_time,
            curve_factor,
        })
    }

    /// Linear opening over `opening_time`.
    pub fn linear(opening_time: f64) -> ComponentResult<Self> {
        Self::new(ValveAction::Opening, OpeningProfile::Linear, opening_time, 0.0)
    }

    pub fn action(&self) -> ValveAction {
        self.action
    }

    pub fn profile(&self) -> OpeningProfile {
        self.profile
    }

    /// Time the valve takes to finish moving, s.
    pub fn travel_time(&self) -> f64 {
        self.opening_time
    }

    /// Opening fraction at elapsed time `t` (s).
    pub fn fraction(&self, t: f64) -> f64 {
        let progress = if self.profile == OpeningProfile::FixedInstant {
            1.0
        } else if t.is_nan() {
            0.0
        } else {
            (t / self.opening_time).clamp(0.0, 1.0)
        };

        let open = if progress >= 1.0 {
            1.0
        } else {
            let c = self.curve_factor;
            let f = match self.profile {
                OpeningProfile::Linear => progress,
                OpeningProfile::Exponential => (c * progress).exp_m1() / c.exp_m1(),
                OpeningProfile::QuickActing => (-c * progress).exp_m1() / (-c).exp_m1(),
                OpeningProfile::FixedInstant => 1.0,
            };
            f.clamp(0.0, 1.0)
        };

        match self.action {
            ValveAction::Opening => open,
            ValveAction::Closing => 1.0 - open,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn any_shape() -> impl Strategy<Value = OpeningProfile> {
        prop_oneof![
            Just(OpeningProfile::Linear),
            Just(OpeningProfile::Exponential),
            Just(OpeningProfile::QuickActing),
        ]
    }

    proptest! {
        #[test]
        fn fraction_bounded_and_monotone(
            shape in any_shape(),
            opening_time in 0.1_f64..100.0,
            c in 0.1_f64..20.0,
            t1 in -10.0_f64..200.0,
            dt in 0.0_f64..50.0,
        ) {
            let open = ValveProfile::new(ValveAction::Opening, shape, opening_time, c).unwrap();
            let close = ValveProfile::new(ValveAction::Closing, shape, opening_time, c).unwrap();
            let (a, b) = (open.fraction(t1), open.fraction(t1 + dt));
            prop_assert!((0.0..=1.0).contains(&a));
            prop_assert!(b >= a - 1e-12);

            let (a, b) = (close.fraction(t1), close.fraction(t1 + dt));
            prop_assert!((0.0..=1.0).contains(&a));
            prop_assert!(b <= a + 1e-12);
        }
    }
}
