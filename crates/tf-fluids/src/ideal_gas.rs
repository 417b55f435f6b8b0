//! Ideal-gas mixture phase.
//!
//! Native state is temperature, density and mass fractions
//! (`[T, D, Y_0 .. Y_{K-1}]`). Pressure follows from `p = ρ R T / M̄`.

use std::collections::BTreeMap;

use crate::error::{FluidError, FluidResult};
use crate::phase::{Phase, validation};
use crate::species::Species;
use crate::state::StateInput;
use tf_core::normalize_fractions;
use tf_core::units::constants::{GAS_CONSTANT, ONE_ATM_PA};
use tf_core::units::{Density, Pressure, Temperature, k, kgm3, pa};

const FULL_STATES: [&str; 6] = ["TDX", "TDY", "TPX", "TPY", "DPX", "DPY"];

/// Ideal-gas mixture of catalogue species.
#[derive(Debug, Clone)]
pub struct IdealGasMixture {
    species: Vec<Species>,
    t: f64,
    rho: f64,
    y: Vec<f64>,
}

impl IdealGasMixture {
    /// Create a mixture of the given species at 300 K, one atmosphere, pure first species.
    pub fn new(species: Vec<Species>) -> FluidResult<Self> {
        if species.is_empty() {
            return Err(FluidError::InvalidArg {
                what: "ideal gas mixture needs at least one species",
            });
        }
        for (i, s) in species.iter().enumerate() {
            if species[..i].contains(s) {
                return Err(FluidError::InvalidArg {
                    what: "duplicate species in ideal gas mixture",
                });
            }
        }

        let mut y = vec![0.0; species.len()];
        y[0] = 1.0;
        let mut gas = Self {
            species,
            t: 300.0,
            rho: 0.0,
            y,
        };
        gas.rho = gas.density_at(300.0, ONE_ATM_PA);
        Ok(gas)
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    /// Mean molar mass [kg/kmol] of the current composition.
    pub fn mean_molar_mass(&self) -> f64 {
        let inv: f64 = self
            .y
            .iter()
            .zip(&self.species)
            .map(|(y, s)| y / s.molar_mass())
            .sum();
        1.0 / inv
    }

    fn density_at(&self, t: f64, p: f64) -> f64 {
        p * self.mean_molar_mass() / (GAS_CONSTANT * t)
    }

    fn set_mass_fractions(&mut self, y: &[f64]) -> FluidResult<()> {
        validation::validate_len("mass fractions", self.species.len(), y.len())?;
        self.y = normalize_fractions(y)?;
        Ok(())
    }

    fn set_mole_fractions(&mut self, x: &[f64]) -> FluidResult<()> {
        validation::validate_len("mole fractions", self.species.len(), x.len())?;
        let x = normalize_fractions(x)?;
        let mass: Vec<f64> = x
            .iter()
            .zip(&self.species)
            .map(|(x, s)| x * s.molar_mass())
            .collect();
        self.y = normalize_fractions(&mass)?;
        Ok(())
    }

    fn set_tp(&mut self, t: Temperature, p: Pressure) -> FluidResult<()> {
        let t = validation::validate_temperature(t)?;
        let p = validation::validate_pressure(p)?;
        self.rho = self.density_at(t, p);
        self.t = t;
        Ok(())
    }

    fn set_td(&mut self, t: Temperature, rho: Density) -> FluidResult<()> {
        self.t = validation::validate_temperature(t)?;
        self.rho = validation::validate_density(rho)?;
        Ok(())
    }

    fn set_dp(&mut self, rho: Density, p: Pressure) -> FluidResult<()> {
        let rho = validation::validate_density(rho)?;
        let p = validation::validate_pressure(p)?;
        self.t = p * self.mean_molar_mass() / (GAS_CONSTANT * rho);
        self.rho = rho;
        Ok(())
    }
}

impl Phase for IdealGasMixture {
    fn name(&self) -> &str {
        "ideal-gas"
    }

    fn state_size(&self) -> usize {
        2 + self.species.len()
    }

    fn native_state(&self) -> BTreeMap<&'static str, usize> {
        BTreeMap::from([("T", 0), ("D", 1), ("Y", 2)])
    }

    fn n_species(&self) -> usize {
        self.species.len()
    }

    fn species_names(&self) -> Vec<String> {
        self.species.iter().map(|s| s.key().to_string()).collect()
    }

    fn species_index(&self, name: &str) -> Option<usize> {
        self.species.iter().position(|s| s.key() == name)
    }

    fn full_states(&self) -> Vec<&'static str> {
        FULL_STATES.to_vec()
    }

    fn set_state(&mut self, input: StateInput) -> FluidResult<()> {
        // Composition first: pressure-based inputs depend on the mean molar mass.
        match input {
            StateInput::TP { t, p } => self.set_tp(t, p),
            StateInput::TPX { t, p, x } => {
                self.set_mole_fractions(&x)?;
                self.set_tp(t, p)
            }
            StateInput::TPY { t, p, y } => {
                self.set_mass_fractions(&y)?;
                self.set_tp(t, p)
            }
            StateInput::TDX { t, rho, x } => {
                self.set_mole_fractions(&x)?;
                self.set_td(t, rho)
            }
            StateInput::TDY { t, rho, y } => {
                self.set_mass_fractions(&y)?;
                self.set_td(t, rho)
            }
            StateInput::DPX { rho, p, x } => {
                self.set_mole_fractions(&x)?;
                self.set_dp(rho, p)
            }
            StateInput::DPY { rho, p, y } => {
                self.set_mass_fractions(&y)?;
                self.set_dp(rho, p)
            }
        }
    }

    fn temperature(&self) -> Temperature {
        k(self.t)
    }

    fn pressure(&self) -> Pressure {
        pa(self.rho * GAS_CONSTANT * self.t / self.mean_molar_mass())
    }

    fn density(&self) -> Density {
        kgm3(self.rho)
    }

    fn mass_fractions(&self) -> Vec<f64> {
        self.y.clone()
    }

    fn mole_fractions(&self) -> Vec<f64> {
        let mmw = self.mean_molar_mass();
        self.y
            .iter()
            .zip(&self.species)
            .map(|(y, s)| y * mmw / s.molar_mass())
            .collect()
    }

    fn save_state(&self, out: &mut [f64]) -> FluidResult<()> {
        validation::validate_len("state vector", self.state_size(), out.len())?;
        out[0] = self.t;
        out[1] = self.rho;
        out[2..].copy_from_slice(&self.y);
        Ok(())
    }

    fn restore_state(&mut self, state: &[f64]) -> FluidResult<()> {
        validation::validate_len("state vector", self.state_size(), state.len())?;
        self.t = state[0];
        self.rho = state[1];
        self.y.copy_from_slice(&state[2..]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tf_core::numeric::{Tolerances, nearly_equal};

    fn h2_o2() -> IdealGasMixture {
        IdealGasMixture::new(vec![Species::H2, Species::O2]).unwrap()
    }

    #[test]
    fn rejects_empty_and_duplicate_species() {
        assert!(IdealGasMixture::new(vec![]).is_err());
        assert!(IdealGasMixture::new(vec![Species::N2, Species::N2]).is_err());
    }

    #[test]
    fn default_state_is_one_atmosphere() {
        let gas = IdealGasMixture::new(vec![Species::N2]).unwrap();
        assert!(nearly_equal(
            gas.pressure().value,
            ONE_ATM_PA,
            Tolerances::default()
        ));
        // N2 at 300 K, 1 atm: ~1.138 kg/m³
        let rho = gas.density().value;
        assert!(rho > 1.1 && rho < 1.2, "rho = {}", rho);
    }

    #[test]
    fn tpy_sets_consistent_density() {
        let mut gas = h2_o2();
        gas.set_state(StateInput::TPY {
            t: k(300.0),
            p: pa(101325.0),
            y: vec![0.1, 0.9],
        })
        .unwrap();

        let mmw = 1.0 / (0.1 / 2.016 + 0.9 / 31.998);
        let expected = 101325.0 * mmw / (GAS_CONSTANT * 300.0);
        assert!(nearly_equal(gas.density().value, expected, Tolerances::default()));
        assert!(nearly_equal(gas.pressure().value, 101325.0, Tolerances::default()));
    }

    #[test]
    fn mole_and_mass_fractions_agree() {
        let mut gas = h2_o2();
        gas.set_state(StateInput::TPX {
            t: k(500.0),
            p: pa(2.0e5),
            x: vec![2.0, 1.0],
        })
        .unwrap();

        let x = gas.mole_fractions();
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(x[0], 2.0 / 3.0, tol));
        assert!(nearly_equal(x[1], 1.0 / 3.0, tol));
        let y = gas.mass_fractions();
        assert!(nearly_equal(y.iter().sum::<f64>(), 1.0, tol));
        assert!(y[1] > y[0]);
    }

    #[test]
    fn dp_inputs_recover_temperature() {
        let mut gas = h2_o2();
        gas.set_state(StateInput::TPY {
            t: k(750.0),
            p: pa(5.0e5),
            y: vec![0.2, 0.8],
        })
        .unwrap();
        let rho = gas.density();

        gas.set_state(StateInput::DPY {
            rho,
            p: pa(5.0e5),
            y: vec![0.2, 0.8],
        })
        .unwrap();
        assert!(nearly_equal(gas.temperature().value, 750.0, Tolerances::default()));
    }

    #[test]
    fn rejects_non_physical_inputs() {
        let mut gas = h2_o2();
        assert!(
            gas.set_state(StateInput::TP {
                t: k(-1.0),
                p: pa(101325.0)
            })
            .is_err()
        );
        assert!(
            gas.set_state(StateInput::TPY {
                t: k(300.0),
                p: pa(101325.0),
                y: vec![1.0],
            })
            .is_err()
        );
    }

    #[test]
    fn save_restore_roundtrip() {
        let mut gas = h2_o2();
        let mut saved = vec![0.0; gas.state_size()];
        gas.set_state(StateInput::TDY {
            t: k(1200.0),
            rho: kgm3(0.3),
            y: vec![0.05, 0.95],
        })
        .unwrap();
        gas.save_state(&mut saved).unwrap();

        let mut other = h2_o2();
        other.restore_state(&saved).unwrap();
        assert_eq!(other.temperature().value, 1200.0);
        assert_eq!(other.density().value, 0.3);
        assert_eq!(other.mass_fractions(), gas.mass_fractions());

        assert!(other.restore_state(&saved[..3]).is_err());
        assert!(gas.save_state(&mut [0.0; 2]).is_err());
    }

    #[test]
    fn native_state_layout() {
        let gas = h2_o2();
        let native = gas.native_state();
        assert_eq!(native["T"], 0);
        assert_eq!(native["D"], 1);
        assert_eq!(native["Y"], gas.state_size() - gas.n_species());
        assert_eq!(gas.species_index("O2"), Some(1));
        assert_eq!(gas.species_index("N2"), None);
    }
}
