//! Entity detection error types.

use thiserror::Error;

/// Errors returned by an [`EntityDetector`](crate::interfaces::EntityDetector)
/// when a whole batch call fails.
///
/// Per-item failures inside an otherwise successful call are not errors; they
/// show up as missing entries in the returned results.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectionError {
    /// Throttling, timeouts and service-side faults. Worth retrying.
    #[error("Transient detection error: {0}")]
    Transient(String),

    /// The service rejected the request (oversized batch, unsupported language, ...).
    #[error("Detection request rejected: {0}")]
    Rejected(String),
}

impl DetectionError {
    /// Create a transient detection error.
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    /// Create a rejected-request error.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
