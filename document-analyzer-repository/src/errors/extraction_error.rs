//! Text extraction error types.

use thiserror::Error;

/// Errors returned by a [`TextExtractor`](crate::interfaces::TextExtractor).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Throttling, timeouts and service-side faults. Worth retrying.
    #[error("Transient extraction error: {0}")]
    Transient(String),

    /// The document cannot be read (bad format, missing object, access denied).
    #[error("Document unreadable: {0}")]
    Permanent(String),
}

impl ExtractionError {
    /// Create a transient extraction error.
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    /// Create a permanent extraction error.
    pub fn permanent(msg: impl Into<String>) -> Self {
        Self::Permanent(msg.into())
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
