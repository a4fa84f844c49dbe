//! Entity detection trait definition.

use async_trait::async_trait;

use crate::errors::DetectionError;
use document_analyzer_shared::EntityMention;

/// Entities found for one text of a submitted batch.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    /// Position of the text within the submitted batch (0-based).
    pub index: usize,
    /// Detected entities, possibly empty.
    pub entities: Vec<EntityMention>,
}

impl DetectionResult {
    pub fn new(index: usize, entities: Vec<EntityMention>) -> Self {
        Self { index, entities }
    }

    /// A result with no detected entities.
    pub fn empty(index: usize) -> Self {
        Self::new(index, Vec::new())
    }
}

/// Detects named entities in batches of text.
///
/// # Partial failure
///
/// A successful call returns one `DetectionResult` per submitted text. When
/// the service fails individual items it may return fewer results; callers
/// must check every batch index is covered before using the results.
#[async_trait]
pub trait EntityDetector: Send + Sync {
    /// Detect entities in every text of `texts`.
    ///
    /// # Arguments
    ///
    /// * `texts` - The batch of texts, at most the service's batch limit
    /// * `language_code` - Language of the texts (e.g. `en`)
    async fn detect_entities_batch(
        &self,
        texts: &[String],
        language_code: &str,
    ) -> Result<Vec<DetectionResult>, DetectionError>;
}
