//! Phase capability trait.
//!
//! A [`Phase`] is a mutable equation-of-state evaluator for one material.
//! State containers hold it through [`SharedPhase`] and drive it row by row:
//! every `restore_state` or `set_state` call overwrites the phase's internal
//! state, and every holder of the same handle observes the change.
//!
//! `SharedPhase` is `Rc<RefCell<_>>` and therefore confined to one thread.
//! Code that needs to share a phase across threads must wrap it in its own
//! lock and serialize every state change against it.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::{FluidError, FluidResult};
use crate::state::StateInput;
use tf_core::units::{Density, Pressure, Temperature};

/// Shared, single-threaded handle to a phase.
pub type SharedPhase = Rc<RefCell<dyn Phase>>;

/// Wrap a concrete phase into a [`SharedPhase`].
pub fn into_shared<P: Phase + 'static>(phase: P) -> SharedPhase {
    Rc::new(RefCell::new(phase))
}

/// Trait for equation-of-state models.
pub trait Phase {
    /// Get the model name (for debugging/logging).
    fn name(&self) -> &str;

    /// Number of values in the native state vector.
    fn state_size(&self) -> usize;

    /// Native state variables and their offsets in the state vector.
    ///
    /// Composition entries (`X` or `Y`) mark the start of a block of
    /// `n_species()` values.
    fn native_state(&self) -> BTreeMap<&'static str, usize>;

    fn n_species(&self) -> usize;

    fn species_names(&self) -> Vec<String>;

    fn species_index(&self, name: &str) -> Option<usize>;

    /// Variable combinations that fully determine the state, in priority order.
    fn full_states(&self) -> Vec<&'static str>;

    /// Set the full state from an explicit input.
    fn set_state(&mut self, input: StateInput) -> FluidResult<()>;

    fn temperature(&self) -> Temperature;

    fn pressure(&self) -> Pressure;

    fn density(&self) -> Density;

    fn mass_fractions(&self) -> Vec<f64>;

    fn mole_fractions(&self) -> Vec<f64>;

    /// Write the native state into `out`, which must hold `state_size()` values.
    fn save_state(&self, out: &mut [f64]) -> FluidResult<()>;

    /// Load the native state from `state`, which must hold `state_size()` values.
    fn restore_state(&mut self, state: &[f64]) -> FluidResult<()>;

    /// Surface-coverage capability, if this phase is a surface.
    fn as_surface(&self) -> Option<&dyn SurfaceCoverage> {
        None
    }

    fn as_surface_mut(&mut self) -> Option<&mut dyn SurfaceCoverage> {
        None
    }
}

/// Capability of phases whose composition is expressed as site coverages.
pub trait SurfaceCoverage {
    /// Set coverages from a species→coverage mapping; unlisted species are zero.
    fn set_coverages_by_name(&mut self, coverages: &BTreeMap<String, f64>) -> FluidResult<()>;

    fn coverages(&self) -> Vec<f64>;
}

/// Convert a species→value mapping into a dense vector ordered like the phase.
///
/// Species missing from the mapping are zero; unknown names fail.
pub fn fractions_by_name(
    phase: &dyn Phase,
    values: &BTreeMap<String, f64>,
) -> FluidResult<Vec<f64>> {
    let mut out = vec![0.0; phase.n_species()];
    for (name, value) in values {
        let ix = phase
            .species_index(name)
            .ok_or_else(|| FluidError::UnknownSpecies { name: name.clone() })?;
        out[ix] = *value;
    }
    Ok(out)
}

/// Validation helpers shared by phase implementations.
pub(crate) mod validation {
    use super::*;

    /// Ensure pressure is positive and finite.
    pub fn validate_pressure(p: Pressure) -> FluidResult<f64> {
        if !p.value.is_finite() || p.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "pressure must be positive and finite",
            });
        }
        Ok(p.value)
    }

    /// Ensure temperature is positive and finite.
    pub fn validate_temperature(t: Temperature) -> FluidResult<f64> {
        if !t.value.is_finite() || t.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }
        Ok(t.value)
    }

    /// Ensure density is positive and finite.
    pub fn validate_density(rho: Density) -> FluidResult<f64> {
        if !rho.value.is_finite() || rho.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "density must be positive and finite",
            });
        }
        Ok(rho.value)
    }

    /// Ensure a state or fraction vector has the expected length.
    pub fn validate_len(what: &'static str, expected: usize, actual: usize) -> FluidResult<()> {
        if expected != actual {
            return Err(FluidError::Length {
                what,
                expected,
                actual,
            });
        }
        Ok(())
    }
}
