//! Gas-phase species catalogue for ideal-gas mixtures.

/// Chemical species available to [`IdealGasMixture`](crate::IdealGasMixture).
///
/// Covers the major and radical species of hydrogen/oxygen and light
/// hydrocarbon combustion in air.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    /// Hydrogen (H₂)
    H2,
    /// Atomic hydrogen (H)
    H,
    /// Atomic oxygen (O)
    O,
    /// Oxygen (O₂)
    O2,
    /// Hydroxyl radical (OH)
    OH,
    /// Water (H₂O)
    H2O,
    /// Hydroperoxyl radical (HO₂)
    HO2,
    /// Hydrogen peroxide (H₂O₂)
    H2O2,
    /// Nitrogen (N₂)
    N2,
    /// Nitric oxide (NO)
    NO,
    /// Argon (Ar)
    Ar,
    /// Helium (He)
    He,
    /// Carbon monoxide (CO)
    CO,
    /// Carbon dioxide (CO₂)
    CO2,
    /// Methane (CH₄)
    CH4,
}

impl Species {
    pub const ALL: [Species; 15] = [
        Species::H2,
        Species::H,
        Species::O,
        Species::O2,
        Species::OH,
        Species::H2O,
        Species::HO2,
        Species::H2O2,
        Species::N2,
        Species::NO,
        Species::Ar,
        Species::He,
        Species::CO,
        Species::CO2,
        Species::CH4,
    ];

    /// Canonical species name, as used for component lookups and on disk.
    pub fn key(&self) -> &'static str {
        match self {
            Species::H2 => "H2",
            Species::H => "H",
            Species::O => "O",
            Species::O2 => "O2",
            Species::OH => "OH",
            Species::H2O => "H2O",
            Species::HO2 => "HO2",
            Species::H2O2 => "H2O2",
            Species::N2 => "N2",
            Species::NO => "NO",
            Species::Ar => "AR",
            Species::He => "HE",
            Species::CO => "CO",
            Species::CO2 => "CO2",
            Species::CH4 => "CH4",
        }
    }

    /// Get human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Species::H2 => "Hydrogen",
            Species::H => "Atomic Hydrogen",
            Species::O => "Atomic Oxygen",
            Species::O2 => "Oxygen",
            Species::OH => "Hydroxyl",
            Species::H2O => "Water",
            Species::HO2 => "Hydroperoxyl",
            Species::H2O2 => "Hydrogen Peroxide",
            Species::N2 => "Nitrogen",
            Species::NO => "Nitric Oxide",
            Species::Ar => "Argon",
            Species::He => "Helium",
            Species::CO => "Carbon Monoxide",
            Species::CO2 => "Carbon Dioxide",
            Species::CH4 => "Methane",
        }
    }

    /// Get molar mass [kg/kmol] for this species.
    pub fn molar_mass(&self) -> f64 {
        match self {
            Species::H2 => 2.016,
            Species::H => 1.008,
            Species::O => 15.999,
            Species::O2 => 31.998,
            Species::OH => 17.007,
            Species::H2O => 18.015,
            Species::HO2 => 33.006,
            Species::H2O2 => 34.014,
            Species::N2 => 28.014,
            Species::NO => 30.006,
            Species::Ar => 39.948,
            Species::He => 4.003,
            Species::CO => 28.010,
            Species::CO2 => 44.009,
            Species::CH4 => 16.043,
        }
    }
}

impl std::str::FromStr for Species {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "H2" | "HYDROGEN" => Ok(Species::H2),
            "H" => Ok(Species::H),
            "O" => Ok(Species::O),
            "O2" | "OXYGEN" => Ok(Species::O2),
            "OH" | "HYDROXYL" => Ok(Species::OH),
            "H2O" | "WATER" => Ok(Species::H2O),
            "HO2" => Ok(Species::HO2),
            "H2O2" | "HYDROGEN PEROXIDE" => Ok(Species::H2O2),
            "N2" | "NITROGEN" => Ok(Species::N2),
            "NO" | "NITRIC OXIDE" => Ok(Species::NO),
            "AR" | "ARGON" => Ok(Species::Ar),
            "HE" | "HELIUM" => Ok(Species::He),
            "CO" | "CARBON MONOXIDE" => Ok(Species::CO),
            "CO2" | "CARBON DIOXIDE" => Ok(Species::CO2),
            "CH4" | "METHANE" => Ok(Species::CH4),
            _ => Err("unknown species"),
        }
    }
}
