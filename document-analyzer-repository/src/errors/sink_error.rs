//! Bulk write sink error types.

use thiserror::Error;

/// Errors returned by a [`BulkWriteSink`](crate::interfaces::BulkWriteSink)
/// when a whole batch call fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// Throttling, timeouts and service-side faults. Worth retrying.
    #[error("Transient sink error: {0}")]
    Transient(String),

    /// The sink rejected the request (missing table, schema mismatch, ...).
    #[error("Write rejected: {0}")]
    Rejected(String),

    /// A record could not be converted into the sink's item format.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SinkError {
    /// Create a transient sink error.
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    /// Create a rejected-write error.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
