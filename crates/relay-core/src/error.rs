//! # Relay Error Types
//!
//! Typed error handling for the payment relay.
//! All platform operations return `Result<T, RelayError>`.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Which expectation failed during approval validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchField {
    Amount,
    Memo,
}

impl fmt::Display for MismatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchField::Amount => f.write_str("Amount"),
            MismatchField::Memo => f.write_str("Memo"),
        }
    }
}

/// Core error type for all relay operations
#[derive(Debug, Error)]
pub enum RelayError {
    /// Required request field absent or empty
    #[error("{0}")]
    MissingField(String),

    /// Upstream record disagrees with what the caller expected
    #[error("{field} mismatch")]
    Mismatch {
        field: MismatchField,
        got: Value,
        expected: Value,
    },

    /// Upstream answered with a non-success status
    #[error("Upstream returned {status}")]
    Upstream { status: u16, body: Value },

    /// No response from upstream at all
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream success body could not be read
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Client or URL construction failed
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl RelayError {
    pub fn missing(message: impl Into<String>) -> Self {
        RelayError::MissingField(message.into())
    }

    /// Returns the HTTP status code to answer the caller with.
    ///
    /// Upstream statuses pass through untouched; anything outside the valid
    /// HTTP range falls back to 500.
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::MissingField(_) => 400,
            RelayError::Mismatch { .. } => 400,
            RelayError::Upstream { status, .. } if (100..=999).contains(status) => *status,
            RelayError::Upstream { .. } => 500,
            RelayError::Network(_) => 500,
            RelayError::Serialization(_) => 500,
            RelayError::Configuration(_) => 500,
        }
    }

    /// Payload describing the failure of an upstream call.
    ///
    /// The upstream body is returned verbatim; errors that never reached the
    /// upstream are wrapped as `{"message": ...}`.
    pub fn detail(&self) -> Value {
        match self {
            RelayError::Upstream { body, .. } => body.clone(),
            other => serde_json::json!({ "message": other.to_string() }),
        }
    }

    /// True for errors produced by local input checks, before any transition call.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RelayError::MissingField(_) | RelayError::Mismatch { .. }
        )
    }
}

/// Result type alias for relay operations
pub type RelayResult<T> = Result<T, RelayError>;
