//! Entity detection stage.
//!
//! Sends line texts to the entity detector in bounded batches and keeps each
//! batch's results together with the number of texts submitted.

use std::num::NonZeroUsize;
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info, instrument};

use crate::batcher::{batch_count, batches};
use crate::errors::PipelineError;
use crate::retry::{with_backoff, RetryPolicy};
use document_analyzer_repository::{DetectionError, DetectionResult, EntityDetector};
use document_analyzer_shared::TextLine;

/// Largest batch the entity detection service accepts.
pub const MAX_DETECT_BATCH_SIZE: usize = 25;

/// Configuration for the detection stage.
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Texts per detection call.
    pub batch_size: NonZeroUsize,
    /// Language code passed with every batch.
    pub language_code: String,
    /// Batch calls allowed in flight at once.
    pub concurrency: NonZeroUsize,
    /// Retry bounds for transient batch failures.
    pub retry: RetryPolicy,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            batch_size: NonZeroUsize::new(MAX_DETECT_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN),
            language_code: "en".to_string(),
            concurrency: NonZeroUsize::MIN,
            retry: RetryPolicy::default(),
        }
    }
}

/// Raw results of one detection call.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchDetection {
    /// Number of texts submitted in the call.
    pub submitted: usize,
    /// Results as returned by the detector; may be short on partial failure.
    pub results: Vec<DetectionResult>,
}

/// Issues batched entity detection calls.
pub struct EntityDetectionStage {
    detector: Arc<dyn EntityDetector>,
    config: DetectionConfig,
}

impl EntityDetectionStage {
    /// Create a detection stage with default configuration.
    pub fn new(detector: Arc<dyn EntityDetector>) -> Self {
        Self {
            detector,
            config: DetectionConfig::default(),
        }
    }

    /// Create a detection stage with custom configuration.
    pub fn with_config(detector: Arc<dyn EntityDetector>, config: DetectionConfig) -> Self {
        Self { detector, config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Detect entities for every line.
    ///
    /// Returns one `BatchDetection` per batch in batch order, regardless of
    /// how many calls ran concurrently.
    #[instrument(skip(self, lines), fields(line_count = lines.len()))]
    pub async fn detect(&self, lines: &[TextLine]) -> Result<Vec<BatchDetection>, PipelineError> {
        let total_batches = batch_count(lines.len(), self.config.batch_size);
        info!(
            texts = lines.len(),
            batches = total_batches,
            "Detecting entities"
        );

        let requests: Vec<Vec<String>> = batches(lines, self.config.batch_size)
            .map(|batch| batch.items.iter().map(|line| line.text.clone()).collect())
            .collect();

        stream::iter(requests.into_iter().enumerate())
            .map(|(batch_index, texts)| self.detect_batch(batch_index, texts))
            .buffered(self.config.concurrency.get())
            .try_collect()
            .await
    }

    async fn detect_batch(
        &self,
        batch_index: usize,
        texts: Vec<String>,
    ) -> Result<BatchDetection, PipelineError> {
        let results = with_backoff(
            &self.config.retry,
            "detect_entities_batch",
            DetectionError::is_retryable,
            || {
                self.detector
                    .detect_entities_batch(&texts, &self.config.language_code)
            },
        )
        .await
        .map_err(|e| PipelineError::detection(batch_index, &e))?;

        debug!(
            batch_index,
            submitted = texts.len(),
            returned = results.len(),
            "Detection batch completed"
        );

        Ok(BatchDetection {
            submitted: texts.len(),
            results,
        })
    }
}
