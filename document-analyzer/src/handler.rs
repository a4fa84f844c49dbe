//! Invocation handler: one storage notification in, one outcome per document out.

use aws_lambda_events::event::s3::S3Event;
use tracing::{info, instrument};

use crate::trigger::document_references;
use crate::AnalyzerError;
use document_analyzer_pipeline::{Orchestrator, ProcessOutcome};

/// Long-lived handler shared by every invocation of the process.
pub struct DocumentAnalyzer {
    orchestrator: Orchestrator,
}

impl DocumentAnalyzer {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }

    /// Process every document referenced by the notification, in order.
    ///
    /// Returns the outcome of each document. If any document failed the
    /// invocation errors so the platform can retry it; rejected and partially
    /// written documents do not fail the invocation.
    #[instrument(skip_all, fields(record_count = event.records.len()))]
    pub async fn handle(&self, event: &S3Event) -> Result<Vec<ProcessOutcome>, AnalyzerError> {
        let documents = document_references(event);
        let mut outcomes = Vec::with_capacity(documents.len());

        for document in &documents {
            outcomes.push(self.orchestrator.process(document).await);
        }

        let failures: Vec<String> = documents
            .iter()
            .zip(&outcomes)
            .filter_map(|(document, outcome)| match outcome {
                ProcessOutcome::Failed { message, .. } => Some(format!("{}: {}", document, message)),
                _ => None,
            })
            .collect();

        if !failures.is_empty() {
            return Err(AnalyzerError::InvocationFailed(failures.join("; ")));
        }

        info!(documents = outcomes.len(), "Invocation complete");
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;

    use document_analyzer_pipeline::detection::EntityDetectionStage;
    use document_analyzer_pipeline::loader::BulkWriter;
    use document_analyzer_repository::{
        BulkWriteSink, DetectionError, DetectionResult, EntityDetector, ExtractionError, SinkError,
        TableSchema, TextExtractor,
    };
    use document_analyzer_shared::{AnalyzedLine, DocumentReference, RawBlock, RecordKey};

    struct MockExtractor;

    #[async_trait]
    impl TextExtractor for MockExtractor {
        async fn extract_text(
            &self,
            document: &DocumentReference,
        ) -> Result<Vec<RawBlock>, ExtractionError> {
            if document.object_key.starts_with("corrupt") {
                return Err(ExtractionError::permanent("bad document"));
            }
            Ok(vec![RawBlock::line("l1", "Hello")])
        }
    }

    struct MockDetector;

    #[async_trait]
    impl EntityDetector for MockDetector {
        async fn detect_entities_batch(
            &self,
            texts: &[String],
            _language_code: &str,
        ) -> Result<Vec<DetectionResult>, DetectionError> {
            Ok((0..texts.len()).map(DetectionResult::empty).collect())
        }
    }

    struct MockSink;

    #[async_trait]
    impl BulkWriteSink for MockSink {
        async fn batch_write(
            &self,
            _table: &TableSchema,
            _items: &[AnalyzedLine],
        ) -> Result<Vec<RecordKey>, SinkError> {
            Ok(Vec::new())
        }
    }

    fn analyzer() -> DocumentAnalyzer {
        let orchestrator = Orchestrator::new(
            Arc::new(MockExtractor),
            EntityDetectionStage::new(Arc::new(MockDetector)),
            BulkWriter::new(Arc::new(MockSink), TableSchema::new("t", "h", "r")),
        );
        DocumentAnalyzer::new(orchestrator)
    }

    fn event(keys: &[&str]) -> S3Event {
        let records: Vec<serde_json::Value> = keys
            .iter()
            .map(|key| {
                serde_json::json!({
                    "eventVersion": "2.1",
                    "eventSource": "aws:s3",
                    "awsRegion": "us-east-1",
                    "eventTime": "2024-05-01T12:00:00.000Z",
                    "eventName": "ObjectCreated:Put",
                    "userIdentity": { "principalId": "EXAMPLE" },
                    "requestParameters": { "sourceIPAddress": "127.0.0.1" },
                    "responseElements": {},
                    "s3": {
                        "s3SchemaVersion": "1.0",
                        "configurationId": "upload",
                        "bucket": {
                            "name": "uploads",
                            "ownerIdentity": { "principalId": "EXAMPLE" },
                            "arn": "arn:aws:s3:::uploads"
                        },
                        "object": { "key": key, "size": 10, "eTag": "abc", "sequencer": "01" }
                    }
                })
            })
            .collect();

        serde_json::from_value(serde_json::json!({ "Records": records })).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_documents_do_not_fail_invocation() {
        let outcomes = analyzer()
            .handle(&event(&["photo.jpg", "notes.txt"]))
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0], ProcessOutcome::Complete { lines_written: 1, .. }));
        assert!(matches!(outcomes[1], ProcessOutcome::Rejected { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_document_fails_invocation() {
        let err = analyzer()
            .handle(&event(&["photo.jpg", "corrupt.pdf"]))
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyzerError::InvocationFailed(ref msg) if msg.contains("corrupt.pdf")));
    }
}
