//! Error types for the document analyzer pipeline.

use serde::Serialize;
use thiserror::Error;

use document_analyzer_repository::{DetectionError, ExtractionError, SinkError};
use document_analyzer_shared::RecordKey;

/// Errors that can occur while processing a document.
///
/// Collaborator errors are translated into one of these at the stage that
/// called the collaborator; none of them leave the orchestrator as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// The object key's extension is not on the allow-list.
    #[error("Unrecognized file type for {object_key}: {reason}")]
    UnrecognizedFileType { object_key: String, reason: String },

    /// Text extraction failed; `transient` is set when retries were exhausted.
    #[error("Extraction failure: {message}")]
    ExtractionFailure { transient: bool, message: String },

    /// An entity detection batch call failed outright.
    #[error("Detection failure in batch {batch_index}: {message}")]
    DetectionFailure { batch_index: usize, message: String },

    /// Detection results for a batch do not line up with the texts submitted.
    #[error("Correlation mismatch in batch {batch_index}: expected {expected} results, {detail}")]
    CorrelationMismatch {
        batch_index: usize,
        expected: usize,
        received: usize,
        detail: String,
    },

    /// Some records were not persisted after retries. `last_error` is the
    /// sink error a batch ended on, if any.
    #[error("Partial write failure: {} of {} records unwritten", unwritten.len(), written + unwritten.len())]
    PartialWriteFailure {
        written: usize,
        unwritten: Vec<RecordKey>,
        last_error: Option<String>,
    },

    /// No record could be written and the sink returned an error.
    #[error("Write failure: {message}")]
    WriteFailure {
        unwritten: Vec<RecordKey>,
        message: String,
    },
}

impl PipelineError {
    /// Create an unrecognized file type error.
    pub fn unrecognized_file_type(object_key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnrecognizedFileType {
            object_key: object_key.into(),
            reason: reason.into(),
        }
    }

    /// Create a detection failure error.
    pub fn detection(batch_index: usize, err: &DetectionError) -> Self {
        Self::DetectionFailure {
            batch_index,
            message: err.to_string(),
        }
    }

    /// Create a correlation mismatch error.
    pub fn correlation_mismatch(
        batch_index: usize,
        expected: usize,
        received: usize,
        detail: impl Into<String>,
    ) -> Self {
        Self::CorrelationMismatch {
            batch_index,
            expected,
            received,
            detail: detail.into(),
        }
    }

    /// Create a write failure error for records none of which were written.
    pub fn write(unwritten: Vec<RecordKey>, err: &SinkError) -> Self {
        Self::WriteFailure {
            unwritten,
            message: err.to_string(),
        }
    }

    /// Keys that were not persisted, for write failures.
    pub fn unwritten(&self) -> &[RecordKey] {
        match self {
            Self::PartialWriteFailure { unwritten, .. } | Self::WriteFailure { unwritten, .. } => {
                unwritten
            }
            _ => &[],
        }
    }

    /// Classify this error for the public outcome.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::UnrecognizedFileType { .. } => FailureKind::UnrecognizedFileType,
            Self::ExtractionFailure { .. } => FailureKind::Extraction,
            Self::DetectionFailure { .. } => FailureKind::Detection,
            Self::CorrelationMismatch { .. } => FailureKind::CorrelationMismatch,
            Self::PartialWriteFailure { .. } | Self::WriteFailure { .. } => FailureKind::Write,
        }
    }
}

impl From<ExtractionError> for PipelineError {
    fn from(err: ExtractionError) -> Self {
        Self::ExtractionFailure {
            transient: err.is_retryable(),
            message: err.to_string(),
        }
    }
}

/// Kind of failure reported by a failed invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UnrecognizedFileType,
    Extraction,
    Detection,
    CorrelationMismatch,
    Write,
}
