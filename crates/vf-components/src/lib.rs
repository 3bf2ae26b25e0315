//! vf-components: valve models for valveflow.
//!
//! Provides:
//! - `ValveProfile`: opening fraction over time (linear, exponential,
//!   quick-acting, fixed-instant; opening or closing)
//! - `FlowRegimeCalculator`: real-gas orifice flow with choked/subsonic
//!   classification
//!
//! Both are pure functions of their inputs and hold no run state.
//!
//! # Example
//!
//! ```no_run
//! use vf_components::{FlowRegimeCalculator, ValveProfile};
//! use vf_core::units::{k, m2, pa};
//! use vf_fluids::GasProperties;
//!
//! let valve = ValveProfile::linear(5.0).unwrap();
//! let calc = FlowRegimeCalculator::new(0.65, m2(5.067e-4)).unwrap();
//! let sol = calc
//!     .evaluate(pa(3.4e6), pa(1.0e5), k(300.0), &GasProperties::ideal_air(), valve.fraction(2.5))
//!     .unwrap();
//! println!("{} kg/s ({})", sol.mass_flow.value, sol.regime);
//! ```

pub mod common;
pub mod error;
pub mod orifice;
pub mod valve;

// Re-exports
pub use error::{ComponentError, ComponentResult};
pub use orifice::{FlowRegime, FlowRegimeCalculator, FlowSolution, critical_pressure_ratio};
pub use valve::{OpeningProfile, ValveAction, ValveProfile};
