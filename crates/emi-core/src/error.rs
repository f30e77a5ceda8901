use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmiError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Out of range: {field} — {reason}")]
    OutOfRange { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl EmiError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        EmiError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn out_of_range(field: &str, reason: impl Into<String>) -> Self {
        EmiError::OutOfRange {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Stable error tag used on the wire (`InvalidInput`, `OutOfRange`, ...).
    pub fn kind(&self) -> &'static str {
        match self {
            EmiError::InvalidInput { .. } => "InvalidInput",
            EmiError::OutOfRange { .. } => "OutOfRange",
            EmiError::SerializationError(_) => "SerializationError",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
        }
    }
}

impl From<serde_json::Error> for EmiError {
    fn from(e: serde_json::Error) -> Self {
        EmiError::SerializationError(e.to_string())
    }
}

/// Error body returned to callers across a process boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl From<&EmiError> for ErrorResponse {
    fn from(e: &EmiError) -> Self {
        e.to_response()
    }
}
