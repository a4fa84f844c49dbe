//! Loader module for the document analyzer pipeline.
//!
//! Writes assembled records to the bulk write sink in bounded batches.

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, instrument, warn};

use crate::batcher::{batch_count, batches};
use crate::retry::RetryPolicy;
use document_analyzer_repository::config::BULK_WRITE_CEILING;
use document_analyzer_repository::{BulkWriteSink, SinkError, TableSchema};
use document_analyzer_shared::{AnalyzedLine, RecordKey};

/// Default records per bulk write call.
pub const DEFAULT_WRITE_BATCH_SIZE: usize = 25;

/// Configuration for the bulk writer.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Destination table and key attribute names.
    pub table: TableSchema,
    /// Records per write call; capped at the bulk-write ceiling.
    pub batch_size: NonZeroUsize,
    /// Batch calls allowed in flight at once.
    pub concurrency: NonZeroUsize,
    /// Attempts per batch, counting the first.
    pub retry: RetryPolicy,
}

impl WriterConfig {
    /// Create a writer configuration for `table` with default limits.
    pub fn new(table: TableSchema) -> Self {
        Self {
            table,
            batch_size: NonZeroUsize::new(DEFAULT_WRITE_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN),
            concurrency: NonZeroUsize::MIN,
            retry: RetryPolicy::new(4, 100, 5000),
        }
    }

    fn effective_batch_size(&self) -> NonZeroUsize {
        let ceiling = NonZeroUsize::new(BULK_WRITE_CEILING).unwrap_or(NonZeroUsize::MIN);
        self.batch_size.min(ceiling)
    }
}

/// Outcome of writing every record of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteReport {
    /// Records confirmed written.
    pub written: usize,
    /// Keys that were still unprocessed when retries ran out, in input order.
    pub unwritten: Vec<RecordKey>,
    /// Last whole-call error seen, if any batch ended on one.
    pub last_error: Option<SinkError>,
}

impl WriteReport {
    pub fn is_complete(&self) -> bool {
        self.unwritten.is_empty()
    }

    fn merge(&mut self, other: WriteReport) {
        self.written += other.written;
        self.unwritten.extend(other.unwritten);
        if other.last_error.is_some() {
            self.last_error = other.last_error;
        }
    }
}

/// Writer that persists analyzed lines through a `BulkWriteSink`.
///
/// The writer is responsible for:
/// - Splitting records into sink-sized batches
/// - Re-submitting only the items a batch reported as unprocessed
/// - Reporting every key that could not be written
pub struct BulkWriter {
    sink: Arc<dyn BulkWriteSink>,
    config: WriterConfig,
}

impl BulkWriter {
    /// Create a new bulk writer with default limits for `table`.
    pub fn new(sink: Arc<dyn BulkWriteSink>, table: TableSchema) -> Self {
        Self {
            sink,
            config: WriterConfig::new(table),
        }
    }

    /// Create a new bulk writer with custom configuration.
    pub fn with_config(sink: Arc<dyn BulkWriteSink>, config: WriterConfig) -> Self {
        Self { sink, config }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Write all records, batch by batch.
    #[instrument(skip(self, records), fields(record_count = records.len(), table = %self.config.table.table_name))]
    pub async fn write(&self, records: &[AnalyzedLine]) -> WriteReport {
        let batch_size = self.config.effective_batch_size();
        info!(
            records = records.len(),
            batches = batch_count(records.len(), batch_size),
            "Writing records"
        );

        let reports: Vec<WriteReport> = stream::iter(batches(records, batch_size).enumerate())
            .map(|(batch_index, batch)| self.write_batch(batch_index, batch.items))
            .buffered(self.config.concurrency.get())
            .collect()
            .await;

        let mut report = WriteReport::default();
        for batch_report in reports {
            report.merge(batch_report);
        }

        if report.is_complete() {
            debug!(written = report.written, "All records written");
        } else {
            error!(
                written = report.written,
                unwritten = report.unwritten.len(),
                "Records left unwritten after retries"
            );
        }
        report
    }

    /// Write one batch, retrying the unprocessed subset with backoff.
    async fn write_batch(&self, batch_index: usize, batch: &[AnalyzedLine]) -> WriteReport {
        let policy = &self.config.retry;
        let attempts = policy.attempts();
        let mut pending: Vec<AnalyzedLine> = batch.to_vec();
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.sink.batch_write(&self.config.table, &pending).await {
                Ok(unprocessed) if unprocessed.is_empty() => {
                    if attempt > 1 {
                        debug!(batch_index, attempt, "Batch fully written after retry");
                    }
                    return WriteReport {
                        written: batch.len(),
                        unwritten: Vec::new(),
                        last_error: None,
                    };
                }
                Ok(unprocessed) => {
                    // Keys the sink reports that were not submitted are ignored.
                    let unprocessed: HashSet<RecordKey> = unprocessed.into_iter().collect();
                    pending.retain(|record| unprocessed.contains(&record.key()));
                    last_error = None;

                    if pending.is_empty() {
                        return WriteReport {
                            written: batch.len(),
                            unwritten: Vec::new(),
                            last_error: None,
                        };
                    }
                    warn!(
                        batch_index,
                        attempt,
                        unprocessed = pending.len(),
                        "Sink left items unprocessed"
                    );
                }
                Err(e) if e.is_retryable() => {
                    warn!(batch_index, attempt, error = %e, "Batch write failed");
                    last_error = Some(e);
                }
                Err(e) => {
                    error!(batch_index, attempt, error = %e, "Batch write rejected");
                    last_error = Some(e);
                    break;
                }
            }

            if attempt < attempts {
                tokio::time::sleep(policy.delay_after(attempt)).await;
            }
        }

        WriteReport {
            written: batch.len() - pending.len(),
            unwritten: pending.iter().map(AnalyzedLine::key).collect(),
            last_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Mock sink that leaves configured keys unprocessed a limited number of times.
    struct MockSink {
        calls: AtomicUsize,
        batch_sizes: Mutex<Vec<usize>>,
        stored: Mutex<HashMap<RecordKey, AnalyzedLine>>,
        /// Key -> remaining times it is reported unprocessed.
        stubborn: Mutex<HashMap<RecordKey, usize>>,
        error: Option<SinkError>,
    }

    impl MockSink {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                batch_sizes: Mutex::new(Vec::new()),
                stored: Mutex::new(HashMap::new()),
                stubborn: Mutex::new(HashMap::new()),
                error: None,
            }
        }

        fn with_unprocessed(keys: &[RecordKey], times: usize) -> Self {
            let sink = Self::new();
            sink.stubborn
                .lock()
                .unwrap()
                .extend(keys.iter().map(|k| (k.clone(), times)));
            sink
        }

        fn failing(error: SinkError) -> Self {
            Self {
                error: Some(error),
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl BulkWriteSink for MockSink {
        async fn batch_write(
            &self,
            _table: &TableSchema,
            items: &[AnalyzedLine],
        ) -> Result<Vec<RecordKey>, SinkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.batch_sizes.lock().unwrap().push(items.len());

            if let Some(error) = &self.error {
                return Err(error.clone());
            }

            let mut stubborn = self.stubborn.lock().unwrap();
            let mut unprocessed = Vec::new();
            for item in items {
                let key = item.key();
                match stubborn.get_mut(&key) {
                    Some(remaining) if *remaining > 0 => {
                        *remaining -= 1;
                        unprocessed.push(key);
                    }
                    _ => {
                        self.stored.lock().unwrap().insert(key, item.clone());
                    }
                }
            }
            Ok(unprocessed)
        }
    }

    fn records(n: usize) -> Vec<AnalyzedLine> {
        (0..n)
            .map(|i| AnalyzedLine {
                document_key: "doc.pdf".to_string(),
                line_id: format!("l{}", i),
                text: format!("text {}", i),
                entities: None,
            })
            .collect()
    }

    fn writer(sink: Arc<MockSink>) -> BulkWriter {
        BulkWriter::new(sink, TableSchema::new("analysis", "document", "line"))
    }

    #[tokio::test(start_paused = true)]
    async fn test_writes_in_batches() {
        let sink = Arc::new(MockSink::new());
        let report = writer(sink.clone()).write(&records(30)).await;

        assert!(report.is_complete());
        assert_eq!(report.written, 30);
        assert_eq!(*sink.batch_sizes.lock().unwrap(), vec![25, 5]);
        assert_eq!(sink.stored.lock().unwrap().len(), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_records_no_calls() {
        let sink = Arc::new(MockSink::new());
        let report = writer(sink.clone()).write(&[]).await;

        assert!(report.is_complete());
        assert_eq!(sink.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unprocessed_items_are_retried_alone() {
        let records = records(5);
        let keys = vec![records[1].key(), records[3].key()];
        let sink = Arc::new(MockSink::with_unprocessed(&keys, 2));

        let report = writer(sink.clone()).write(&records).await;

        assert!(report.is_complete());
        assert_eq!(report.written, 5);
        assert_eq!(*sink.batch_sizes.lock().unwrap(), vec![5, 2, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_report_exact_keys() {
        let records = records(30);
        let keys = vec![records[2].key(), records[26].key(), records[29].key()];
        let sink = Arc::new(MockSink::with_unprocessed(&keys, usize::MAX));

        let report = writer(sink.clone()).write(&records).await;

        assert_eq!(report.unwritten, keys);
        assert_eq!(report.written, 27);
        assert!(report.last_error.is_none());
        // Four attempts per batch: the full batch, then only its stubborn keys.
        assert_eq!(*sink.batch_sizes.lock().unwrap(), vec![25, 1, 1, 1, 5, 2, 2, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_write_is_not_retried() {
        let sink = Arc::new(MockSink::failing(SinkError::rejected("no such table")));

        let report = writer(sink.clone()).write(&records(3)).await;

        assert_eq!(report.written, 0);
        assert_eq!(report.unwritten.len(), 3);
        assert_eq!(report.last_error, Some(SinkError::rejected("no such table")));
        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_write_error_is_retried() {
        let sink = Arc::new(MockSink::failing(SinkError::transient("throttled")));

        let report = writer(sink.clone()).write(&records(3)).await;

        assert_eq!(report.unwritten.len(), 3);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_batch_size_is_capped() {
        let mut config = WriterConfig::new(TableSchema::new("t", "h", "r"));
        config.batch_size = NonZeroUsize::new(500).unwrap();
        assert_eq!(config.effective_batch_size().get(), BULK_WRITE_CEILING);
    }
}
