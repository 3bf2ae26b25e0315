//! Chemical species definitions.

/// Gas components available for composition-derived properties.
///
/// Covers the usual natural-gas and industrial-gas constituents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Species {
    /// Methane (CH₄)
    Methane,
    /// Ethane (C₂H₆)
    Ethane,
    /// Propane (C₃H₈)
    Propane,
    /// n-Butane
    NButane,
    /// Isobutane
    IButane,
    /// n-Pentane
    NPentane,
    /// Isopentane
    IPentane,
    /// n-Hexane
    NHexane,
    /// n-Heptane
    NHeptane,
    /// n-Octane
    NOctane,
    /// Nitrogen (N₂)
    Nitrogen,
    /// Carbon dioxide (CO₂)
    CarbonDioxide,
    /// Hydrogen sulfide (H₂S)
    HydrogenSulfide,
    /// Water (H₂O)
    Water,
    /// Oxygen (O₂)
    Oxygen,
    /// Hydrogen (H₂)
    Hydrogen,
    /// Carbon monoxide (CO)
    CarbonMonoxide,
    /// Argon (Ar)
    Argon,
    /// Helium (He)
    Helium,
    /// Ammonia (NH₃)
    Ammonia,
}

/// Pure-component constants used by the cubic equation of state.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SpeciesData {
    pub name: &'static str,
    pub formula: &'static str,
    /// kg/mol
    pub molar_mass: f64,
    /// K
    pub tc: f64,
    /// Pa
    pub pc: f64,
    pub omega: f64,
    /// Ideal-gas Cp = a + bT + cT² + dT³, J/(mol·K)
    pub cp: [f64; 4],
}

const fn data(
    name: &'static str,
    formula: &'static str,
    molar_mass_g: f64,
    tc: f64,
    pc_mpa: f64,
    omega: f64,
    cp: [f64; 4],
) -> SpeciesData {
    SpeciesData {
        name,
        formula,
        molar_mass: molar_mass_g / 1000.0,
        tc,
        pc: pc_mpa * 1.0e6,
        omega,
        cp,
    }
}

impl Species {
    pub const ALL: [Species; 20] = [
        Species::Methane,
        Species::Ethane,
        Species::Propane,
        Species::NButane,
        Species::IButane,
        Species::NPentane,
        Species::IPentane,
        Species::NHexane,
        Species::NHeptane,
        Species::NOctane,
        Species::Nitrogen,
        Species::CarbonDioxide,
        Species::HydrogenSulfide,
        Species::Water,
        Species::Oxygen,
        Species::Hydrogen,
        Species::CarbonMonoxide,
        Species::Argon,
        Species::Helium,
        Species::Ammonia,
    ];

    pub(crate) fn data(&self) -> SpeciesData {
        match self {
            Species::Methane => data(
                "Methane",
                "CH4",
                16.043,
                190.56,
                4.599,
                0.011,
                [19.25, 5.213e-2, 1.197e-5, -1.132e-8],
            ),
            Species::Ethane => data(
                "Ethane",
                "C2H6",
                30.070,
                305.32,
                4.872,
                0.099,
                [5.409, 1.781e-1, -6.938e-5, 8.713e-9],
            ),
            Species::Propane => data(
                "Propane",
                "C3H8",
                44.097,
                369.83,
                4.248,
                0.152,
                [-4.224, 3.063e-1, -1.586e-4, 3.215e-8],
            ),
            Species::NButane => data(
                "n-Butane",
                "nC4H10",
                58.123,
                425.12,
                3.796,
                0.200,
                [9.487, 3.313e-1, -1.108e-4, -2.822e-9],
            ),
            Species::IButane => data(
                "i-Butane",
                "iC4H10",
                58.123,
                407.8,
                3.640,
                0.186,
                [-1.390, 3.847e-1, -1.846e-4, 2.895e-8],
            ),
            Species::NPentane => data(
                "n-Pentane",
                "nC5H12",
                72.150,
                469.7,
                3.370,
                0.252,
                [-3.626, 4.873e-1, -2.580e-4, 5.305e-8],
            ),
            Species::IPentane => data(
                "i-Pentane",
                "iC5H12",
                72.150,
                460.4,
                3.380,
                0.229,
                [-9.525, 5.066e-1, -2.729e-4, 5.723e-8],
            ),
            Species::NHexane => data(
                "n-Hexane",
                "C6H14",
                86.177,
                507.6,
                3.025,
                0.301,
                [-4.413, 5.820e-1, -3.119e-4, 6.494e-8],
            ),
            Species::NHeptane => data(
                "n-Heptane",
                "C7H16",
                100.204,
                540.2,
                2.740,
                0.350,
                [-5.146, 6.762e-1, -3.651e-4, 7.658e-8],
            ),
            Species::NOctane => data(
                "n-Octane",
                "C8H18",
                114.231,
                568.7,
                2.490,
                0.399,
                [-6.096, 7.712e-1, -4.195e-4, 8.855e-8],
            ),
            Species::Nitrogen => data(
                "Nitrogen",
                "N2",
                28.014,
                126.2,
                3.398,
                0.037,
                [31.15, -1.357e-2, 2.680e-5, -1.168e-8],
            ),
            Species::CarbonDioxide => data(
                "Carbon dioxide",
                "CO2",
                44.010,
                304.12,
                7.374,
                0.225,
                [19.80, 7.344e-2, -5.602e-5, 1.715e-8],
            ),
            Species::HydrogenSulfide => data(
                "Hydrogen sulfide",
                "H2S",
                34.081,
                373.2,
                8.940,
                0.090,
                [31.94, 1.436e-3, 2.432e-5, -1.176e-8],
            ),
            Species::Water => data(
                "Water",
                "H2O",
                18.015,
                647.1,
                22.064,
                0.344,
                [32.24, 1.924e-3, 1.055e-5, -3.596e-9],
            ),
            Species::Oxygen => data(
                "Oxygen",
                "O2",
                31.999,
                154.58,
                5.043,
                0.022,
                [28.11, -3.680e-6, 1.746e-5, -1.065e-8],
            ),
            Species::Hydrogen => data(
                "Hydrogen",
                "H2",
                2.016,
                33.19,
                1.313,
                -0.216,
                [27.14, 9.274e-3, -1.381e-5, 7.645e-9],
            ),
            Species::CarbonMonoxide => data(
                "Carbon monoxide",
                "CO",
                28.010,
                132.85,
                3.494,
                0.045,
                [30.87, -1.285e-2, 2.789e-5, -1.272e-8],
            ),
            Species::Argon => data("Argon", "Ar", 39.948, 150.86, 4.898, -0.002, [20.80, 0.0, 0.0, 0.0]),
            Species::Helium => data("Helium", "He", 4.003, 5.19, 0.227, -0.390, [20.80, 0.0, 0.0, 0.0]),
            Species::Ammonia => data(
                "Ammonia",
                "NH3",
                17.031,
                405.4,
                11.333,
                0.253,
                [27.31, 2.383e-2, 1.707e-5, -1.185e-8],
            ),
        }
    }

    /// Canonical display name (e.g. "Carbon dioxide").
    pub fn name(&self) -> &'static str {
        self.data().name
    }

    pub fn formula(&self) -> &'static str {
        self.data().formula
    }

    /// Molar mass in kg/mol.
    pub fn molar_mass(&self) -> f64 {
        self.data().molar_mass
    }

    /// Look up a species by name or formula, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Species> {
        let query = name.trim();
        Species::ALL.into_iter().find(|species| {
            let d = species.data();
            d.name.eq_ignore_ascii_case(query) || d.formula.eq_ignore_ascii_case(query)
        })
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
