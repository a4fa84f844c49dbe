//! Orchestrator module for the document analyzer pipeline.
//!
//! Drives one document through every stage, strictly in order:
//!
//! `Received -> TypeValidated -> TextExtracted -> LinesFiltered ->
//! EntitiesDetected -> Correlated -> Assembled -> Written -> Complete`
//!
//! An unrecognized extension ends at `Rejected` before any collaborator is
//! called; any unrecoverable collaborator error ends at `Failed`.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::correlator::EntityCorrelator;
use crate::detection::EntityDetectionStage;
use crate::errors::{FailureKind, PipelineError};
use crate::loader::BulkWriter;
use crate::processor::{LineFilter, RecordAssembler};
use crate::retry::{with_backoff, RetryPolicy};
use document_analyzer_repository::{ExtractionError, TextExtractor};
use document_analyzer_shared::{DocumentReference, RawBlock, RecordKey};

/// Stages a document passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Received,
    TypeValidated,
    TextExtracted,
    LinesFiltered,
    EntitiesDetected,
    Correlated,
    Assembled,
    Written,
    Complete,
    Rejected,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Result of processing one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProcessOutcome {
    /// Every line was written.
    Complete {
        document_key: String,
        lines_written: usize,
    },
    /// Some lines were written; the listed keys were not.
    PartialSuccess {
        document_key: String,
        written: usize,
        unwritten: Vec<RecordKey>,
        /// Sink error a write batch ended on, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        last_error: Option<String>,
    },
    /// The document type is not processed. Expected, not an error.
    Rejected { object_key: String, reason: String },
    /// Processing stopped on an unrecoverable error after `stage`.
    Failed {
        kind: FailureKind,
        stage: PipelineStage,
        message: String,
        /// Keys not persisted; only set for write failures.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        unwritten: Vec<RecordKey>,
    },
}

impl ProcessOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Lower-cased extensions accepted for processing.
    pub allowed_extensions: HashSet<String>,
    /// Retry bounds for transient extraction failures.
    pub extraction_retry: RetryPolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: ["jpg", "png", "pdf"].into_iter().map(String::from).collect(),
            extraction_retry: RetryPolicy::default(),
        }
    }
}

/// Orchestrator that coordinates the pipeline components.
///
/// Collaborator clients are held for the orchestrator's lifetime and shared
/// across every document it processes. No state is carried between documents.
pub struct Orchestrator {
    extractor: Arc<dyn TextExtractor>,
    line_filter: LineFilter,
    detection: EntityDetectionStage,
    correlator: EntityCorrelator,
    assembler: RecordAssembler,
    writer: BulkWriter,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create a new orchestrator with the given components.
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        detection: EntityDetectionStage,
        writer: BulkWriter,
    ) -> Self {
        Self::with_config(extractor, detection, writer, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        extractor: Arc<dyn TextExtractor>,
        detection: EntityDetectionStage,
        writer: BulkWriter,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            extractor,
            line_filter: LineFilter::new(),
            detection,
            correlator: EntityCorrelator::new(),
            assembler: RecordAssembler::new(),
            writer,
            config,
        }
    }

    /// Process the document stored under `object_key` in `container_id`.
    pub async fn process_document(&self, container_id: &str, object_key: &str) -> ProcessOutcome {
        self.process(&DocumentReference::new(container_id, object_key))
            .await
    }

    /// Process one document end to end.
    ///
    /// Never returns an error: every failure is reported through the outcome.
    #[instrument(skip(self, document), fields(document = %document))]
    pub async fn process(&self, document: &DocumentReference) -> ProcessOutcome {
        let mut stage = PipelineStage::Received;
        let document_key = document.document_key().to_string();

        match self.run(document, &mut stage).await {
            Ok(lines_written) => ProcessOutcome::Complete {
                document_key,
                lines_written,
            },
            Err(PipelineError::UnrecognizedFileType { object_key, reason }) => {
                advance(&mut stage, PipelineStage::Rejected);
                warn!(object_key = %object_key, reason = %reason, "Skipping document");
                ProcessOutcome::Rejected { object_key, reason }
            }
            Err(PipelineError::PartialWriteFailure {
                written,
                unwritten,
                last_error,
            }) => {
                warn!(
                    written,
                    unwritten = unwritten.len(),
                    last_error = last_error.as_deref().unwrap_or("none"),
                    "Document analysis partially saved"
                );
                ProcessOutcome::PartialSuccess {
                    document_key,
                    written,
                    unwritten,
                    last_error,
                }
            }
            Err(e) => {
                error!(last_stage = %stage, error = %e, "Document processing failed");
                let last_stage = stage;
                advance(&mut stage, PipelineStage::Failed);
                ProcessOutcome::Failed {
                    kind: e.kind(),
                    stage: last_stage,
                    message: e.to_string(),
                    unwritten: e.unwritten().to_vec(),
                }
            }
        }
    }

    /// Run every stage, returning the number of lines written.
    async fn run(
        &self,
        document: &DocumentReference,
        stage: &mut PipelineStage,
    ) -> Result<usize, PipelineError> {
        self.validate_type(document)?;
        advance(stage, PipelineStage::TypeValidated);
        info!(document = %document, "Invoked with valid document");

        let blocks = self.extract(document).await?;
        advance(stage, PipelineStage::TextExtracted);

        let lines = self.line_filter.filter(blocks);
        advance(stage, PipelineStage::LinesFiltered);
        info!(line_count = lines.len(), "Extracted lines of text");

        let detections = self.detection.detect(&lines).await?;
        advance(stage, PipelineStage::EntitiesDetected);

        let entities = self.correlator.correlate(&lines, detections)?;
        advance(stage, PipelineStage::Correlated);

        let records = self
            .assembler
            .assemble_all(document.document_key(), &lines, entities);
        advance(stage, PipelineStage::Assembled);

        let report = self.writer.write(&records).await;
        advance(stage, PipelineStage::Written);

        if !report.is_complete() {
            return match report.last_error {
                Some(e) if report.written == 0 => Err(PipelineError::write(report.unwritten, &e)),
                last_error => Err(PipelineError::PartialWriteFailure {
                    written: report.written,
                    unwritten: report.unwritten,
                    last_error: last_error.map(|e| e.to_string()),
                }),
            };
        }

        advance(stage, PipelineStage::Complete);
        info!(lines_written = report.written, "Document analysis saved");
        Ok(report.written)
    }

    fn validate_type(&self, document: &DocumentReference) -> Result<(), PipelineError> {
        match document.extension() {
            None => Err(PipelineError::unrecognized_file_type(
                &document.object_key,
                "unable to infer document type",
            )),
            Some(ext) if !self.config.allowed_extensions.contains(&ext) => {
                Err(PipelineError::unrecognized_file_type(
                    &document.object_key,
                    format!("extension '{}' is not processed", ext),
                ))
            }
            Some(_) => Ok(()),
        }
    }

    async fn extract(
        &self,
        document: &DocumentReference,
    ) -> Result<Vec<RawBlock>, PipelineError> {
        let blocks = with_backoff(
            &self.config.extraction_retry,
            "extract_text",
            ExtractionError::is_retryable,
            || self.extractor.extract_text(document),
        )
        .await?;

        debug!(block_count = blocks.len(), "Text extraction completed");
        Ok(blocks)
    }
}

fn advance(stage: &mut PipelineStage, next: PipelineStage) {
    debug!(from = %stage, to = %next, "Stage transition");
    *stage = next;
}
