//! Comprehend implementation of `EntityDetector`.

use async_trait::async_trait;
use aws_sdk_comprehend::error::DisplayErrorContext;
use aws_sdk_comprehend::types::{BatchDetectEntitiesItemResult, LanguageCode};
use aws_sdk_comprehend::Client;
use tracing::{debug, instrument, warn};

use crate::aws::is_transient;
use crate::errors::DetectionError;
use crate::interfaces::{DetectionResult, EntityDetector};
use document_analyzer_shared::EntityMention;

/// Batch named-entity detection.
pub struct ComprehendDetector {
    client: Client,
}

impl ComprehendDetector {
    /// Create a detector from a loaded AWS configuration.
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    /// Wrap an already-built Comprehend client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn to_detection_result(item: &BatchDetectEntitiesItemResult) -> Option<DetectionResult> {
        let index = usize::try_from(item.index()?).ok()?;

        let entities = item
            .entities()
            .iter()
            .map(|entity| {
                EntityMention::new(
                    entity.text().unwrap_or_default(),
                    entity.r#type().map(|t| t.as_str()).unwrap_or("OTHER"),
                    entity.score().unwrap_or_default(),
                )
            })
            .collect();

        Some(DetectionResult::new(index, entities))
    }
}

#[async_trait]
impl EntityDetector for ComprehendDetector {
    #[instrument(skip(self, texts), fields(text_count = texts.len()))]
    async fn detect_entities_batch(
        &self,
        texts: &[String],
        language_code: &str,
    ) -> Result<Vec<DetectionResult>, DetectionError> {
        let output = self
            .client
            .batch_detect_entities()
            .set_text_list(Some(texts.to_vec()))
            .language_code(LanguageCode::from(language_code))
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                if is_transient(&e) {
                    DetectionError::transient(message)
                } else {
                    DetectionError::rejected(message)
                }
            })?;

        for failed in output.error_list() {
            warn!(
                index = ?failed.index(),
                code = failed.error_code().unwrap_or_default(),
                message = failed.error_message().unwrap_or_default(),
                "Comprehend failed an item in the batch"
            );
        }

        let results: Vec<DetectionResult> = output
            .result_list()
            .iter()
            .filter_map(Self::to_detection_result)
            .collect();

        debug!(
            submitted = texts.len(),
            returned = results.len(),
            "Comprehend batch completed"
        );
        Ok(results)
    }
}
