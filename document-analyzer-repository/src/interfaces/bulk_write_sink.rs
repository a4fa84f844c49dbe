//! Bulk write sink trait definition.

use async_trait::async_trait;

use crate::config::TableSchema;
use crate::errors::SinkError;
use document_analyzer_shared::{AnalyzedLine, RecordKey};

/// Keyed bulk-write destination for analyzed lines.
///
/// Records are upserted under `(document_key, line_id)`; writing the same key
/// twice overwrites the earlier record.
#[async_trait]
pub trait BulkWriteSink: Send + Sync {
    /// Write one batch of records.
    ///
    /// # Arguments
    ///
    /// * `table` - Destination table and key attribute names
    /// * `items` - The records to upsert, at most the sink's batch limit
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<RecordKey>)` - Keys the sink accepted the call for but did not
    ///   process; empty when every record was written
    /// * `Err(SinkError)` - If the whole call failed and nothing is known to be written
    async fn batch_write(
        &self,
        table: &TableSchema,
        items: &[AnalyzedLine],
    ) -> Result<Vec<RecordKey>, SinkError>;
}
