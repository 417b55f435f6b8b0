//! tf-fluids: phase models for thermoflow state containers.
//!
//! Provides:
//! - The [`Phase`] capability trait: state size, native-variable layout,
//!   species lookup, full-state modes, explicit setters, save/restore
//! - [`StateInput`] explicit state inputs
//! - [`IdealGasMixture`], an ideal-gas mixture of catalogue [`Species`]
//! - [`SurfacePhase`], a site-coverage surface implementing [`SurfaceCoverage`]
//!
//! # Example
//!
//! ```
//! use tf_core::units::{k, pa};
//! use tf_fluids::{IdealGasMixture, Phase, Species, StateInput};
//!
//! let mut gas = IdealGasMixture::new(vec![Species::H2, Species::O2]).unwrap();
//! gas.set_state(StateInput::TPY {
//!     t: k(300.0),
//!     p: pa(101325.0),
//!     y: vec![0.1, 0.9],
//! })
//! .unwrap();
//! println!("Density: {} kg/m³", gas.density().value);
//! ```

pub mod error;
pub mod ideal_gas;
pub mod phase;
pub mod species;
pub mod state;
pub mod surface;

// Re-exports for ergonomics
pub use error::{FluidError, FluidResult};
pub use ideal_gas::IdealGasMixture;
pub use phase::{Phase, SharedPhase, SurfaceCoverage, fractions_by_name, into_shared};
pub use species::Species;
pub use state::StateInput;
pub use surface::SurfacePhase;
