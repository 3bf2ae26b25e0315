//! Gas composition (pure or mixtures).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FluidError, FluidResult};
use crate::species::Species;
use vf_core::numeric::{Tolerances, nearly_equal};

/// Allowed deviation of the mole-fraction sum from one.
pub const SUM_TOLERANCE: f64 = 1e-3;

/// Gas composition defined by mole fractions.
///
/// Fractions are validated, never renormalized: a set that does not sum to
/// one within [`SUM_TOLERANCE`] is rejected so a typo cannot silently turn
/// into a different gas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct Composition {
    items: Vec<(Species, f64)>,
}

impl Composition {
    /// Create a pure-species composition.
    pub fn pure(species: Species) -> Self {
        Self {
            items: vec![(species, 1.0)],
        }
    }

    /// Create a composition from mole fractions.
    ///
    /// Zero entries are dropped. Repeated species are merged.
    pub fn new_mole_fractions(fractions: Vec<(Species, f64)>) -> FluidResult<Self> {
        if fractions.is_empty() {
            return Err(FluidError::composition("empty composition"));
        }

        let mut merged: BTreeMap<Species, f64> = BTreeMap::new();
        for (species, frac) in fractions {
            if !frac.is_finite() {
                return Err(FluidError::composition(format!(
                    "non-finite mole fraction for {species}"
                )));
            }
            if frac < 0.0 {
                return Err(FluidError::composition(format!(
                    "negative mole fraction for {species}: {frac}"
                )));
            }
            *merged.entry(species).or_insert(0.0) += frac;
        }

        let sum: f64 = merged.values().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(FluidError::composition(format!(
                "mole fractions sum to {sum}, expected 1"
            )));
        }

        let items: Vec<(Species, f64)> = merged.into_iter().filter(|(_, f)| *f > 0.0).collect();
        Ok(Self { items })
    }

    /// Parse the `"Methane=0.9, Ethane=0.1"` form.
    pub fn parse(text: &str) -> FluidResult<Self> {
        let mut fractions = Vec::new();
        for pair in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| FluidError::composition(format!("expected Name=fraction, got '{pair}'")))?;
            let species = Species::from_name(name)
                .ok_or_else(|| FluidError::composition(format!("unknown species '{}'", name.trim())))?;
            let frac: f64 = value
                .trim()
                .parse()
                .map_err(|_| FluidError::composition(format!("invalid fraction '{}'", value.trim())))?;
            fractions.push((species, frac));
        }
        Self::new_mole_fractions(fractions)
    }

    /// Get mole fraction of a species (0.0 if not present).
    pub fn mole_fraction(&self, species: Species) -> f64 {
        self.items
            .iter()
            .find(|(s, _)| *s == species)
            .map(|(_, f)| *f)
            .unwrap_or(0.0)
    }

    /// Check if this is a pure-species composition.
    pub fn is_pure(&self) -> Option<Species> {
        if self.items.len() == 1 {
            let (species, frac) = self.items[0];
            let tol = Tolerances {
                abs: SUM_TOLERANCE,
                rel: 0.0,
            };
            if nearly_equal(frac, 1.0, tol) {
                return Some(species);
            }
        }
        None
    }

    /// Iterate over all species with non-zero mole fractions.
    pub fn iter(&self) -> impl Iterator<Item = (Species, f64)> + '_ {
        self.items.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Mixture molar mass in kg/mol: M_mix = Σ x_i·M_i.
    pub fn molar_mass(&self) -> f64 {
        self.items
            .iter()
            .map(|(species, mole_frac)| species.molar_mass() * mole_frac)
            .sum()
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (species, frac)) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{species}={frac}")?;
        }
        Ok(())
    }
}

impl TryFrom<BTreeMap<String, f64>> for Composition {
    type Error = FluidError;

    fn try_from(map: BTreeMap<String, f64>) -> FluidResult<Self> {
        let fractions = map
            .into_iter()
            .map(|(name, frac)| {
                Species::from_name(&name)
                    .map(|s| (s, frac))
                    .ok_or_else(|| FluidError::composition(format!("unknown species '{name}'")))
            })
            .collect::<FluidResult<Vec<_>>>()?;
        Self::new_mole_fractions(fractions)
    }
}

impl From<Composition> for BTreeMap<String, f64> {
    fn from(comp: Composition) -> Self {
        comp.items
            .into_iter()
            .map(|(s, f)| (s.name().to_string(), f))
            .collect()
    }
}
