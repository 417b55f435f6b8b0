//! Error types for state arrays and their persisted formats.

use std::path::PathBuf;

use tf_fluids::FluidError;

/// Result type for tf-states operations.
pub type StatesResult<T> = Result<T, StatesError>;

/// Errors raised by [`SolutionArray`](crate::SolutionArray) and its format adapters.
///
/// Every error is terminal for the call that raised it. The array may be
/// partially modified and should be discarded.
#[derive(Debug, thiserror::Error)]
pub enum StatesError {
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Index {index} out of range for SolutionArray with {size} entries")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("Invalid index: {what}")]
    InvalidIndex { what: &'static str },

    #[error("Incompatible size for component '{name}': expected {expected}, got {actual}")]
    SizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("No component named '{name}'")]
    UnknownComponent { name: String },

    #[error("Unsupported format: {what}")]
    UnsupportedFormat { what: String },

    #[error("Unsupported state mode: {what}")]
    UnsupportedStateMode { what: String },

    #[error("Incomplete state information: missing {}", .missing.join(", "))]
    IncompleteState { missing: Vec<String> },

    #[error("No field or solution with id '{path}'")]
    Structural { path: String },

    #[error("Not implemented: {what}")]
    NotImplemented { what: String },

    #[error("Phase error: {0}")]
    Fluid(#[from] FluidError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error for {path}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Store error: {message}")]
    Store { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StatesError::IncompleteState {
            missing: vec!["D".into(), "Y".into()],
        };
        assert_eq!(err.to_string(), "Incomplete state information: missing D, Y");

        let err = StatesError::Structural {
            path: "/group/sub".into(),
        };
        assert!(err.to_string().contains("/group/sub"));

        let err = StatesError::IndexOutOfRange { index: 5, size: 3 };
        assert!(err.to_string().contains("5"));
    }

    #[test]
    fn fluid_errors_convert() {
        let err: StatesError = FluidError::UnknownSpecies {
            name: "XYZ".into(),
        }
        .into();
        assert!(matches!(err, StatesError::Fluid(_)));
    }
}
