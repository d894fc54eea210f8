use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body reported by the validation service on a non-200 response
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ServiceError {
    #[serde(rename = "error", default)]
    pub message: String,
}

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Main error type for every way a document check can fail
#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Failed to decode response body (HTTP {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("Service error (HTTP {status}): {error}")]
    Service { status: u16, error: ServiceError },

    #[error("Invalid service URL: {url} - {details}")]
    InvalidUrl { url: String, details: String },
}

impl ValidatorError {
    /// True for failures that happened below the service protocol:
    /// connection errors, cancellation and deadlines.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ValidatorError::Http(_)
                | ValidatorError::Io(_)
                | ValidatorError::Cancelled
                | ValidatorError::Timeout { .. }
        )
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, ValidatorError::Decode { .. })
    }

    /// The service-reported error, if the service rejected the document
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            ValidatorError::Service { error, .. } => Some(error),
            _ => None,
        }
    }

    /// HTTP status of the response that produced this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ValidatorError::Decode { status, .. } | ValidatorError::Service { status, .. } => {
                Some(*status)
            }
            ValidatorError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ValidatorError>;
