//! Fluid property errors.

use tf_core::TfError;
use thiserror::Error;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur while driving a phase model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Non-physical values (negative density, pressure, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Operation not supported by this phase (e.g., an unsupported state input).
    #[error("Not supported: {what}")]
    NotSupported { what: &'static str },

    /// Species name not known to the phase.
    #[error("Unknown species '{name}'")]
    UnknownSpecies { name: String },

    /// State vector or fraction vector of the wrong length.
    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    Length {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl From<FluidError> for TfError {
    fn from(err: FluidError) -> Self {
        match err {
            FluidError::NonPhysical { what } => TfError::Invariant {
                what: format!("Non-physical fluid value: {}", what),
            },
            FluidError::InvalidArg { what } => TfError::InvalidArg {
                what: format!("Invalid fluid argument: {}", what),
            },
            FluidError::NotSupported { what } => TfError::Invariant {
                what: format!("Fluid operation not supported: {}", what),
            },
            FluidError::UnknownSpecies { name } => TfError::InvalidArg {
                what: format!("Unknown species: {}", name),
            },
            err @ FluidError::Length { .. } => TfError::InvalidArg {
                what: err.to_string(),
            },
        }
    }
}

impl From<TfError> for FluidError {
    fn from(err: TfError) -> Self {
        match err {
            TfError::NonFinite { what, .. } => FluidError::NonPhysical { what },
            TfError::InvalidArg { .. } | TfError::Invariant { .. } => FluidError::NonPhysical {
                what: "fractions must contain a positive, finite entry",
            },
        }
    }
}
