//! Dependency initialization and wiring for the document analyzer.

use std::sync::Arc;
use tracing::info;

use crate::config::AnalyzerConfig;
use crate::handler::DocumentAnalyzer;
use crate::AnalyzerError;
use document_analyzer_pipeline::detection::EntityDetectionStage;
use document_analyzer_pipeline::loader::BulkWriter;
use document_analyzer_pipeline::Orchestrator;
use document_analyzer_repository::aws::load_sdk_config;
use document_analyzer_repository::{ComprehendDetector, DynamoDbSink, TextractExtractor};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured analyzer ready to handle trigger events.
    pub analyzer: DocumentAnalyzer,
}

impl Dependencies {
    /// Initialize all dependencies from the environment.
    ///
    /// Reads a `.env` file when present, then [`AnalyzerConfig::from_env`].
    /// AWS clients are created once here and reused for every invocation.
    pub async fn new() -> Result<Self, AnalyzerError> {
        dotenv::dotenv().ok();
        let config = AnalyzerConfig::from_env()?;
        Self::from_config(config).await
    }

    /// Initialize all dependencies from an explicit configuration.
    pub async fn from_config(config: AnalyzerConfig) -> Result<Self, AnalyzerError> {
        info!(
            table = %config.table_name,
            hash_key = %config.hash_key_name,
            range_key = %config.range_key_name,
            detect_batch_size = config.max_detect_batch_size,
            write_batch_size = config.max_write_batch_size,
            "Initializing dependencies"
        );

        let sdk_config = load_sdk_config().await;
        if sdk_config.region().is_none() {
            return Err(AnalyzerError::config("No AWS region configured"));
        }

        let extractor = Arc::new(TextractExtractor::new(&sdk_config));
        let detection = EntityDetectionStage::with_config(
            Arc::new(ComprehendDetector::new(&sdk_config)),
            config.detection_config(),
        );
        let writer = BulkWriter::with_config(
            Arc::new(DynamoDbSink::new(&sdk_config)),
            config.writer_config(),
        );

        info!("AWS clients created");

        let orchestrator = Orchestrator::with_config(
            extractor,
            detection,
            writer,
            config.orchestrator_config(),
        );

        Ok(Self {
            analyzer: DocumentAnalyzer::new(orchestrator),
        })
    }
}
