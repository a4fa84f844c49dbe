//! Entity correlator.
//!
//! Joins per-batch detection results back to the lines they were computed
//! for. Batch `j` covers lines `[offset_j, offset_j + submitted_j)`, where
//! `offset_j` is the sum of the sizes of all earlier batches; a result with
//! local index `k` belongs to line `offset_j + k`.
//!
//! Every batch must return exactly one result per submitted text. A short,
//! long, duplicated or out-of-range result set fails the whole document with
//! `CorrelationMismatch` instead of shifting entities onto the wrong lines.

use tracing::{debug, instrument};

use crate::detection::BatchDetection;
use crate::errors::PipelineError;
use document_analyzer_shared::{EntityMention, TextLine};

#[derive(Debug, Default, Clone, Copy)]
pub struct EntityCorrelator;

impl EntityCorrelator {
    pub fn new() -> Self {
        Self
    }

    /// Produce the entity list for every line, position `i` for line `i`.
    #[instrument(skip_all, fields(line_count = lines.len(), batch_count = detections.len()))]
    pub fn correlate(
        &self,
        lines: &[TextLine],
        detections: Vec<BatchDetection>,
    ) -> Result<Vec<Vec<EntityMention>>, PipelineError> {
        let mut correlated: Vec<Option<Vec<EntityMention>>> = vec![None; lines.len()];
        let batch_count = detections.len();
        let mut offset = 0;

        for (batch_index, detection) in detections.into_iter().enumerate() {
            let expected = detection.submitted;
            let received = detection.results.len();

            if received != expected {
                return Err(PipelineError::correlation_mismatch(
                    batch_index,
                    expected,
                    received,
                    format!("received {}", received),
                ));
            }

            if offset + expected > lines.len() {
                return Err(PipelineError::correlation_mismatch(
                    batch_index,
                    expected,
                    received,
                    format!(
                        "batch covers lines {}..{} but only {} lines exist",
                        offset,
                        offset + expected,
                        lines.len()
                    ),
                ));
            }

            for result in detection.results {
                if result.index >= expected {
                    return Err(PipelineError::correlation_mismatch(
                        batch_index,
                        expected,
                        received,
                        format!("result index {} is out of range", result.index),
                    ));
                }

                let slot = &mut correlated[offset + result.index];
                if slot.is_some() {
                    return Err(PipelineError::correlation_mismatch(
                        batch_index,
                        expected,
                        received,
                        format!("result index {} returned twice", result.index),
                    ));
                }
                *slot = Some(result.entities);
            }

            debug!(batch_index, offset, size = expected, "Correlated batch");
            offset += expected;
        }

        if offset != lines.len() {
            return Err(PipelineError::correlation_mismatch(
                batch_count,
                lines.len(),
                offset,
                format!("batches covered {} of {} lines", offset, lines.len()),
            ));
        }

        // Every slot is filled: each batch supplied `expected` distinct in-range
        // indices and the batch sizes sum to the line count.
        Ok(correlated.into_iter().map(Option::unwrap_or_default).collect())
    }
}
