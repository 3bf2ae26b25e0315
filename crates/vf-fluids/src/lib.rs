//! vf-fluids: gas property calculations for valveflow.
//!
//! Provides:
//! - Species constants for common natural-gas and industrial components
//! - Composition handling (pure gases and mixtures, validated mole fractions)
//! - `GasProperties` (Z, k, M) and the `PropertyProvider` trait
//! - A Peng-Robinson provider for composition-derived properties
//! - Preset mixtures
//!
//! # Example
//!
//! ```no_run
//! use vf_fluids::{Composition, PengRobinson, PropertyProvider};
//! use vf_core::units::{pa, k};
//!
//! let provider = PengRobinson::new();
//! let comp = Composition::parse("Methane=0.9, Ethane=0.1").unwrap();
//! let props = provider.properties(&comp, pa(5.0e6), k(300.0)).unwrap();
//! println!("Z = {:.4}, k = {:.4}", props.z, props.k);
//! ```

pub mod composition;
pub mod error;
pub mod model;
pub mod peng_robinson;
pub mod presets;
pub mod species;

// Re-exports for ergonomics
pub use composition::Composition;
pub use error::{FluidError, FluidResult};
pub use model::{AIR_MOLAR_MASS, GasProperties, PropertyProvider};
pub use peng_robinson::{PengRobinson, PrState};
pub use presets::Preset;
pub use species::Species;
