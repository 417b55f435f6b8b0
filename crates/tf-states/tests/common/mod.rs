//! Shared helpers for tf-states integration tests.
#![allow(dead_code)]

use std::cell::Cell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Once;
use std::time::{SystemTime, UNIX_EPOCH};

use tf_core::units::{Density, Pressure, Temperature, k, pa};
use tf_fluids::{
    FluidResult, IdealGasMixture, Phase, SharedPhase, Species, StateInput, into_shared,
};
use tf_states::{Metadata, SolutionArray};

static TRACING: Once = Once::new();

/// Route tracing output through the test harness (`RUST_LOG`-style filter).
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn unique_temp_path(prefix: &str, extension: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "{}_{}_{}.{}",
        prefix,
        std::process::id(),
        nanos,
        extension
    ))
}

pub fn h2_o2() -> IdealGasMixture {
    IdealGasMixture::new(vec![Species::H2, Species::O2]).unwrap()
}

pub fn h2_o2_n2() -> IdealGasMixture {
    IdealGasMixture::new(vec![Species::H2, Species::O2, Species::N2]).unwrap()
}

pub fn empty_array(phase: SharedPhase) -> SolutionArray {
    SolutionArray::new(phase, 0, Metadata::new()).unwrap()
}

/// Array of `temps.len()` ideal-gas states at `p` with a fixed composition.
pub fn gas_array(temps: &[f64], p: f64, y: &[f64]) -> SolutionArray {
    let phase = into_shared(h2_o2_n2());
    let mut arr = SolutionArray::new(phase.clone(), temps.len(), Metadata::new()).unwrap();
    arr.initialize(&[]).unwrap();
    let stride = arr.stride();
    let mut rows = Vec::with_capacity(temps.len());
    for &t in temps {
        let mut state = vec![0.0; stride];
        let mut gas = phase.borrow_mut();
        gas.set_state(StateInput::TPY {
            t: k(t),
            p: pa(p),
            y: y.to_vec(),
        })
        .unwrap();
        gas.save_state(&mut state).unwrap();
        rows.push(state);
    }
    for (name, col) in [("T", 0), ("D", 1)] {
        let column: Vec<f64> = rows.iter().map(|r| r[col]).collect();
        arr.set_component(name, &column, false).unwrap();
    }
    for (j, species) in ["H2", "O2", "N2"].iter().enumerate() {
        let column: Vec<f64> = rows.iter().map(|r| r[2 + j]).collect();
        arr.set_component(species, &column, false).unwrap();
    }
    arr
}

/// Ideal-gas phase that counts `restore_state` calls.
pub struct CountingPhase {
    inner: IdealGasMixture,
    restores: Rc<Cell<usize>>,
}

impl CountingPhase {
    pub fn new(inner: IdealGasMixture) -> (Self, Rc<Cell<usize>>) {
        let restores = Rc::new(Cell::new(0));
        (
            Self {
                inner,
                restores: restores.clone(),
            },
            restores,
        )
    }
}

impl Phase for CountingPhase {
    fn name(&self) -> &str {
        "counting"
    }

    fn state_size(&self) -> usize {
        self.inner.state_size()
    }

    fn native_state(&self) -> BTreeMap<&'static str, usize> {
        self.inner.native_state()
    }

    fn n_species(&self) -> usize {
        self.inner.n_species()
    }

    fn species_names(&self) -> Vec<String> {
        self.inner.species_names()
    }

    fn species_index(&self, name: &str) -> Option<usize> {
        self.inner.species_index(name)
    }

    fn full_states(&self) -> Vec<&'static str> {
        self.inner.full_states()
    }

    fn set_state(&mut self, input: StateInput) -> FluidResult<()> {
        self.inner.set_state(input)
    }

    fn temperature(&self) -> Temperature {
        self.inner.temperature()
    }

    fn pressure(&self) -> Pressure {
        self.inner.pressure()
    }

    fn density(&self) -> Density {
        self.inner.density()
    }

    fn mass_fractions(&self) -> Vec<f64> {
        self.inner.mass_fractions()
    }

    fn mole_fractions(&self) -> Vec<f64> {
        self.inner.mole_fractions()
    }

    fn save_state(&self, out: &mut [f64]) -> FluidResult<()> {
        self.inner.save_state(out)
    }

    fn restore_state(&mut self, state: &[f64]) -> FluidResult<()> {
        self.restores.set(self.restores.get() + 1);
        self.inner.restore_state(state)
    }
}

/// Phase reporting an empty state vector.
pub struct InvalidPhase;

impl Phase for InvalidPhase {
    fn name(&self) -> &str {
        "invalid"
    }

    fn state_size(&self) -> usize {
        0
    }

    fn native_state(&self) -> BTreeMap<&'static str, usize> {
        BTreeMap::new()
    }

    fn n_species(&self) -> usize {
        0
    }

    fn species_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn species_index(&self, _name: &str) -> Option<usize> {
        None
    }

    fn full_states(&self) -> Vec<&'static str> {
        Vec::new()
    }

    fn set_state(&mut self, _input: StateInput) -> FluidResult<()> {
        Ok(())
    }

    fn temperature(&self) -> Temperature {
        k(0.0)
    }

    fn pressure(&self) -> Pressure {
        pa(0.0)
    }

    fn density(&self) -> Density {
        tf_core::units::kgm3(0.0)
    }

    fn mass_fractions(&self) -> Vec<f64> {
        Vec::new()
    }

    fn mole_fractions(&self) -> Vec<f64> {
        Vec::new()
    }

    fn save_state(&self, _out: &mut [f64]) -> FluidResult<()> {
        Ok(())
    }

    fn restore_state(&mut self, _state: &[f64]) -> FluidResult<()> {
        Ok(())
    }
}

pub fn assert_close(actual: &[f64], expected: &[f64], rel: f64) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (a, e) in actual.iter().zip(expected) {
        let scale = a.abs().max(e.abs()).max(1.0);
        assert!(
            (a - e).abs() <= rel * scale,
            "{} differs from {} (rel {})",
            a,
            e,
            rel
        );
    }
}
