//! tf-core: stable foundation for the thermoflow state containers.
//!
//! Contains:
//! - units (uom SI types + constructors for the state variables)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{TfError, TfResult};
pub use numeric::*;
pub use units::*;
