//! Named preset mixtures.

use serde::{Deserialize, Serialize};

use crate::composition::Composition;
use crate::error::FluidResult;
use crate::species::Species;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    NaturalGas,
    PureMethane,
    RichGas,
    SourGas,
    LeanGas,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::NaturalGas,
        Preset::PureMethane,
        Preset::RichGas,
        Preset::SourGas,
        Preset::LeanGas,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Preset::NaturalGas => "natural_gas",
            Preset::PureMethane => "pure_methane",
            Preset::RichGas => "rich_gas",
            Preset::SourGas => "sour_gas",
            Preset::LeanGas => "lean_gas",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Preset::NaturalGas => "Natural Gas (Pipeline)",
            Preset::PureMethane => "Pure Methane",
            Preset::RichGas => "Rich Gas",
            Preset::SourGas => "Sour Gas",
            Preset::LeanGas => "Lean Gas",
        }
    }

    pub fn from_id(id: &str) -> Option<Preset> {
        Preset::ALL.into_iter().find(|p| p.id() == id.trim())
    }

    fn fractions(&self) -> Vec<(Species, f64)> {
        use Species::*;
        match self {
            Preset::NaturalGas => vec![
                (Methane, 0.9387),
                (Ethane, 0.0121),
                (Propane, 0.0004),
                (CarbonDioxide, 0.0054),
                (Nitrogen, 0.0433),
            ],
            Preset::PureMethane => vec![(Methane, 1.0)],
            Preset::RichGas => vec![
                (Methane, 0.75),
                (Ethane, 0.12),
                (Propane, 0.08),
                (NButane, 0.03),
                (NPentane, 0.01),
                (CarbonDioxide, 0.005),
                (Nitrogen, 0.005),
            ],
            Preset::SourGas => vec![
                (Methane, 0.80),
                (Ethane, 0.05),
                (Propane, 0.02),
                (NButane, 0.01),
                (CarbonDioxide, 0.08),
                (HydrogenSulfide, 0.04),
            ],
            Preset::LeanGas => vec![
                (Methane, 0.96),
                (Ethane, 0.02),
                (Propane, 0.005),
                (CarbonDioxide, 0.005),
                (Nitrogen, 0.01),
            ],
        }
    }

    pub fn composition(&self) -> FluidResult<Composition> {
        Composition::new_mole_fractions(self.fractions())
    }
}
