//! Text extraction trait definition.

use async_trait::async_trait;

use crate::errors::ExtractionError;
use document_analyzer_shared::{DocumentReference, RawBlock};

/// Extracts structural blocks (pages, lines, words) from a stored document.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Run text detection over the referenced document.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<RawBlock>)` - Every block the service produced, in service order
    /// * `Err(ExtractionError::Transient)` - If the call may succeed when retried
    /// * `Err(ExtractionError::Permanent)` - If the document cannot be read
    async fn extract_text(
        &self,
        document: &DocumentReference,
    ) -> Result<Vec<RawBlock>, ExtractionError>;
}
