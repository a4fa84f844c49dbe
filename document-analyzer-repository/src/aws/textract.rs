//! Textract implementation of `TextExtractor`.

use async_trait::async_trait;
use aws_sdk_textract::error::DisplayErrorContext;
use aws_sdk_textract::types::{Block, Document, S3Object};
use aws_sdk_textract::Client;
use tracing::{debug, instrument};

use crate::aws::is_transient;
use crate::errors::ExtractionError;
use crate::interfaces::TextExtractor;
use document_analyzer_shared::{BlockType, DocumentReference, RawBlock};

/// Synchronous text detection over documents stored in S3.
pub struct TextractExtractor {
    client: Client,
}

impl TextractExtractor {
    /// Create an extractor from a loaded AWS configuration.
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    /// Wrap an already-built Textract client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn to_raw_block(block: &Block) -> RawBlock {
        let block_type = block
            .block_type()
            .map(|t| BlockType::from_wire(t.as_str()))
            .unwrap_or_else(|| BlockType::Other(String::new()));

        RawBlock::new(
            block.id().unwrap_or_default(),
            block_type,
            block.text().map(str::to_string),
        )
    }
}

#[async_trait]
impl TextExtractor for TextractExtractor {
    #[instrument(skip(self, document), fields(document = %document))]
    async fn extract_text(
        &self,
        document: &DocumentReference,
    ) -> Result<Vec<RawBlock>, ExtractionError> {
        let s3_object = S3Object::builder()
            .bucket(&document.container_id)
            .name(&document.object_key)
            .build();

        let output = self
            .client
            .detect_document_text()
            .document(Document::builder().s3_object(s3_object).build())
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                if is_transient(&e) {
                    ExtractionError::transient(message)
                } else {
                    ExtractionError::permanent(message)
                }
            })?;

        let blocks: Vec<RawBlock> = output.blocks().iter().map(Self::to_raw_block).collect();

        debug!(block_count = blocks.len(), "Textract returned blocks");
        Ok(blocks)
    }
}
