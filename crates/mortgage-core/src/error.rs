use thiserror::Error;

/// Failures outside the calculation path. Calculations themselves never
/// fail: bad numeric input is normalized and reported as a warning.
#[derive(Debug, Error)]
pub enum MortgageError {
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for MortgageError {
    fn from(e: serde_json::Error) -> Self {
        MortgageError::SerializationError(e.to_string())
    }
}
