//! Explicit state inputs accepted by [`Phase::set_state`](crate::Phase::set_state).

use tf_core::units::{Density, Pressure, Temperature};

/// Explicit input for setting the full thermodynamic state of a phase.
///
/// Each variant corresponds to a full-state mode code reported by
/// [`Phase::full_states`](crate::Phase::full_states): `T` temperature,
/// `D` density, `P` pressure, `X` mole fractions, `Y` mass fractions.
/// Fraction vectors are ordered like the phase's species and are normalized
/// by the phase.
#[derive(Debug, Clone, PartialEq)]
pub enum StateInput {
    /// Temperature and pressure; composition is left unchanged.
    TP { t: Temperature, p: Pressure },
    /// Temperature, pressure and mole fractions.
    TPX {
        t: Temperature,
        p: Pressure,
        x: Vec<f64>,
    },
    /// Temperature, pressure and mass fractions.
    TPY {
        t: Temperature,
        p: Pressure,
        y: Vec<f64>,
    },
    /// Temperature, density and mole fractions.
    TDX {
        t: Temperature,
        rho: Density,
        x: Vec<f64>,
    },
    /// Temperature, density and mass fractions.
    TDY {
        t: Temperature,
        rho: Density,
        y: Vec<f64>,
    },
    /// Density, pressure and mole fractions.
    DPX {
        rho: Density,
        p: Pressure,
        x: Vec<f64>,
    },
    /// Density, pressure and mass fractions.
    DPY {
        rho: Density,
        p: Pressure,
        y: Vec<f64>,
    },
}

impl StateInput {
    /// Full-state mode code of this input.
    pub fn mode(&self) -> &'static str {
        match self {
            StateInput::TP { .. } => "TP",
            StateInput::TPX { .. } => "TPX",
            StateInput::TPY { .. } => "TPY",
            StateInput::TDX { .. } => "TDX",
            StateInput::TDY { .. } => "TDY",
            StateInput::DPX { .. } => "DPX",
            StateInput::DPY { .. } => "DPY",
        }
    }
}
