use thiserror::Error;

use crate::http::FetchRequest;

/// Failure of a single transport attempt. Every variant is retryable.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),
}

/// Outcome of the fetch layer once retries are spent or the envelope says no.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("fetch exhausted after {attempts} attempts for {request}: {last_error}")]
    Exhausted {
        request: FetchRequest,
        attempts: u32,
        last_error: TransportError,
    },

    /// The server answered, but the application envelope carried `res: false`.
    #[error("no data for {request}")]
    SoftEmpty { request: FetchRequest },

    #[error("unreadable envelope for {request}: {reason}")]
    InvalidEnvelope { request: FetchRequest, reason: String },
}

impl FetchError {
    pub fn is_soft_empty(&self) -> bool {
        matches!(self, FetchError::SoftEmpty { .. })
    }
}

/// A single record could not be extracted from its document.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{page}: {reason}")]
pub struct ExtractionFailure {
    pub page: &'static str,
    pub reason: String,
}

impl ExtractionFailure {
    pub fn new(page: &'static str, reason: impl Into<String>) -> Self {
        Self {
            page,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum YearError {
    #[error("cannot determine the year of tournament '{name}'")]
    UnknownYear { name: String },
}

/// Add context to store errors
pub fn store_context(operation: &str, id: &str) -> String {
    format!("Failed to {} for {}", operation, id)
}
