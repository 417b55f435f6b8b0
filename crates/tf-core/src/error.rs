use thiserror::Error;

pub type TfResult<T> = Result<T, TfError>;

/// Errors shared by the numeric helpers and phase models.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TfError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Invariant violated: {what}")]
    Invariant { what: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_value() {
        let err = TfError::NonFinite {
            what: "fraction",
            value: f64::INFINITY,
        };
        assert_eq!(err.to_string(), "Non-finite numeric value for fraction: inf");
        let err = TfError::InvalidArg {
            what: "fractions sum to zero".to_string(),
        };
        assert!(err.to_string().contains("sum to zero"));
    }
}
