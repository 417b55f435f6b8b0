//! Surface phase with site-coverage composition.
//!
//! Native state is temperature, pressure and coverages (`[T, P, θ_0 .. θ_{K-1}]`).
//! Coverages double as the phase's mole fractions. Surface species carry no
//! molar masses here, so mass fractions equal coverages and `density()`
//! reports the site density.

use std::collections::BTreeMap;

use crate::error::{FluidError, FluidResult};
use crate::phase::{Phase, SurfaceCoverage, validation};
use crate::state::StateInput;
use tf_core::normalize_fractions;
use tf_core::units::constants::ONE_ATM_PA;
use tf_core::units::{Density, Pressure, Temperature, k, kgm3, pa};

#[derive(Debug, Clone)]
pub struct SurfacePhase {
    species: Vec<String>,
    site_density: f64,
    t: f64,
    p: f64,
    theta: Vec<f64>,
}

impl SurfacePhase {
    /// Create a surface fully covered by its first species, at 300 K and one atmosphere.
    pub fn new(species: &[&str], site_density: f64) -> FluidResult<Self> {
        if species.is_empty() {
            return Err(FluidError::InvalidArg {
                what: "surface phase needs at least one species",
            });
        }
        if !site_density.is_finite() || site_density <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "site density must be positive and finite",
            });
        }

        let mut theta = vec![0.0; species.len()];
        theta[0] = 1.0;
        Ok(Self {
            species: species.iter().map(|s| s.to_string()).collect(),
            site_density,
            t: 300.0,
            p: ONE_ATM_PA,
            theta,
        })
    }

    pub fn site_density(&self) -> f64 {
        self.site_density
    }

    fn set_coverages(&mut self, theta: &[f64]) -> FluidResult<()> {
        validation::validate_len("coverages", self.species.len(), theta.len())?;
        self.theta = normalize_fractions(theta)?;
        Ok(())
    }
}

impl Phase for SurfacePhase {
    fn name(&self) -> &str {
        "surface"
    }

    fn state_size(&self) -> usize {
        2 + self.species.len()
    }

    fn native_state(&self) -> BTreeMap<&'static str, usize> {
        BTreeMap::from([("T", 0), ("P", 1), ("X", 2)])
    }

    fn n_species(&self) -> usize {
        self.species.len()
    }

    fn species_names(&self) -> Vec<String> {
        self.species.clone()
    }

    fn species_index(&self, name: &str) -> Option<usize> {
        self.species.iter().position(|s| s == name)
    }

    fn full_states(&self) -> Vec<&'static str> {
        vec!["TPX"]
    }

    fn set_state(&mut self, input: StateInput) -> FluidResult<()> {
        match input {
            StateInput::TP { t, p } => {
                self.t = validation::validate_temperature(t)?;
                self.p = validation::validate_pressure(p)?;
                Ok(())
            }
            StateInput::TPX { t, p, x } => {
                let t = validation::validate_temperature(t)?;
                let p = validation::validate_pressure(p)?;
                self.set_coverages(&x)?;
                self.t = t;
                self.p = p;
                Ok(())
            }
            _ => Err(FluidError::NotSupported {
                what: "surface phases accept TP and TPX inputs only",
            }),
        }
    }

    fn temperature(&self) -> Temperature {
        k(self.t)
    }

    fn pressure(&self) -> Pressure {
        pa(self.p)
    }

    fn density(&self) -> Density {
        kgm3(self.site_density)
    }

    fn mass_fractions(&self) -> Vec<f64> {
        self.theta.clone()
    }

    fn mole_fractions(&self) -> Vec<f64> {
        self.theta.clone()
    }

    fn save_state(&self, out: &mut [f64]) -> FluidResult<()> {
        validation::validate_len("state vector", self.state_size(), out.len())?;
        out[0] = self.t;
        out[1] = self.p;
        out[2..].copy_from_slice(&self.theta);
        Ok(())
    }

    fn restore_state(&mut self, state: &[f64]) -> FluidResult<()> {
        validation::validate_len("state vector", self.state_size(), state.len())?;
        self.t = state[0];
        self.p = state[1];
        self.theta.copy_from_slice(&state[2..]);
        Ok(())
    }

    fn as_surface(&self) -> Option<&dyn SurfaceCoverage> {
        Some(self)
    }

    fn as_surface_mut(&mut self) -> Option<&mut dyn SurfaceCoverage> {
        Some(self)
    }
}

impl SurfaceCoverage for SurfacePhase {
    fn set_coverages_by_name(&mut self, coverages: &BTreeMap<String, f64>) -> FluidResult<()> {
        let theta = crate::phase::fractions_by_name(&*self, coverages)?;
        self.set_coverages(&theta)
    }

    fn coverages(&self) -> Vec<f64> {
        self.theta.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt_surface() -> SurfacePhase {
        SurfacePhase::new(&["PT(S)", "H(S)", "O(S)"], 2.7063e-9).unwrap()
    }

    #[test]
    fn rejects_invalid_construction() {
        assert!(SurfacePhase::new(&[], 1.0).is_err());
        assert!(SurfacePhase::new(&["PT(S)"], 0.0).is_err());
    }

    #[test]
    fn coverages_by_name_are_normalized() {
        let mut surf = pt_surface();
        let cov = BTreeMap::from([("H(S)".to_string(), 1.0), ("O(S)".to_string(), 3.0)]);
        surf.set_coverages_by_name(&cov).unwrap();
        assert_eq!(surf.coverages(), vec![0.0, 0.25, 0.75]);
        assert_eq!(surf.mole_fractions(), surf.coverages());
    }

    #[test]
    fn unknown_coverage_species_fails() {
        let mut surf = pt_surface();
        let cov = BTreeMap::from([("CO(S)".to_string(), 1.0)]);
        assert!(matches!(
            surf.set_coverages_by_name(&cov),
            Err(FluidError::UnknownSpecies { .. })
        ));
    }

    #[test]
    fn rejects_density_inputs() {
        let mut surf = pt_surface();
        let err = surf
            .set_state(StateInput::TDX {
                t: k(300.0),
                rho: kgm3(1.0),
                x: vec![1.0, 0.0, 0.0],
            })
            .unwrap_err();
        assert!(matches!(err, FluidError::NotSupported { .. }));
    }

    #[test]
    fn exposes_surface_capability() {
        let mut surf = pt_surface();
        assert!(surf.as_surface().is_some());
        assert!(surf.as_surface_mut().is_some());
        assert_eq!(surf.native_state()["X"], 2);
    }
}
