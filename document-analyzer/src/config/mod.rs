//! Configuration for the document analyzer.

mod dependencies;

pub use dependencies::Dependencies;

use std::collections::HashSet;
use std::env;
use std::num::NonZeroUsize;
use std::str::FromStr;

use crate::AnalyzerError;
use document_analyzer_pipeline::detection::{DetectionConfig, MAX_DETECT_BATCH_SIZE};
use document_analyzer_pipeline::loader::{WriterConfig, DEFAULT_WRITE_BATCH_SIZE};
use document_analyzer_pipeline::retry::RetryPolicy;
use document_analyzer_pipeline::OrchestratorConfig;
use document_analyzer_repository::config::BULK_WRITE_CEILING;
use document_analyzer_repository::TableSchema;

const DEFAULT_ALLOWED_EXTENSIONS: &str = "jpg,png,pdf";
const DEFAULT_LANGUAGE_CODE: &str = "en";
const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 4;
const DEFAULT_MAX_EXTRACTION_ATTEMPTS: u32 = 3;
const DEFAULT_INITIAL_RETRY_DELAY_MS: u64 = 100;
const DEFAULT_MAX_RETRY_DELAY_MS: u64 = 5000;

/// Settings for one analyzer process, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    pub table_name: String,
    pub hash_key_name: String,
    pub range_key_name: String,
    pub max_detect_batch_size: usize,
    pub max_write_batch_size: usize,
    pub allowed_extensions: HashSet<String>,
    pub language_code: String,
    pub max_write_attempts: u32,
    pub max_extraction_attempts: u32,
    pub initial_retry_delay_ms: u64,
    pub max_retry_delay_ms: u64,
    pub batch_concurrency: usize,
}

impl AnalyzerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TABLE_NAME`: Destination table (required)
    /// - `TABLE_HASH`: Partition key attribute name (required)
    /// - `TABLE_RANGE`: Sort key attribute name (required)
    /// - `MAX_DETECT_BATCH_SIZE`: Texts per detection call (default: 25, max 25)
    /// - `MAX_WRITE_BATCH_SIZE`: Records per write call (default: 25, max 100)
    /// - `ALLOWED_EXTENSIONS`: Comma-separated extensions (default: jpg,png,pdf)
    /// - `LANGUAGE_CODE`: Language passed to entity detection (default: en)
    /// - `MAX_WRITE_ATTEMPTS`: Attempts per write batch (default: 4)
    /// - `MAX_EXTRACTION_ATTEMPTS`: Attempts per extraction or detection call (default: 3)
    /// - `INITIAL_RETRY_DELAY_MS`: First backoff delay (default: 100)
    /// - `MAX_RETRY_DELAY_MS`: Backoff cap (default: 5000)
    /// - `BATCH_CONCURRENCY`: Batch calls in flight at once (default: 1)
    pub fn from_env() -> Result<Self, AnalyzerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AnalyzerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| AnalyzerError::config(format!("{} must be set", key)))
        };

        let config = Self {
            table_name: required("TABLE_NAME")?,
            hash_key_name: required("TABLE_HASH")?,
            range_key_name: required("TABLE_RANGE")?,
            max_detect_batch_size: parse_or(&lookup, "MAX_DETECT_BATCH_SIZE", MAX_DETECT_BATCH_SIZE)?,
            max_write_batch_size: parse_or(&lookup, "MAX_WRITE_BATCH_SIZE", DEFAULT_WRITE_BATCH_SIZE)?,
            allowed_extensions: parse_extensions(
                &lookup("ALLOWED_EXTENSIONS").unwrap_or_else(|| DEFAULT_ALLOWED_EXTENSIONS.to_string()),
            ),
            language_code: lookup("LANGUAGE_CODE").unwrap_or_else(|| DEFAULT_LANGUAGE_CODE.to_string()),
            max_write_attempts: parse_or(&lookup, "MAX_WRITE_ATTEMPTS", DEFAULT_MAX_WRITE_ATTEMPTS)?,
            max_extraction_attempts: parse_or(
                &lookup,
                "MAX_EXTRACTION_ATTEMPTS",
                DEFAULT_MAX_EXTRACTION_ATTEMPTS,
            )?,
            initial_retry_delay_ms: parse_or(
                &lookup,
                "INITIAL_RETRY_DELAY_MS",
                DEFAULT_INITIAL_RETRY_DELAY_MS,
            )?,
            max_retry_delay_ms: parse_or(&lookup, "MAX_RETRY_DELAY_MS", DEFAULT_MAX_RETRY_DELAY_MS)?,
            batch_concurrency: parse_or(&lookup, "BATCH_CONCURRENCY", 1)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check limits the collaborators impose.
    pub fn validate(&self) -> Result<(), AnalyzerError> {
        if self.max_detect_batch_size == 0 || self.max_detect_batch_size > MAX_DETECT_BATCH_SIZE {
            return Err(AnalyzerError::config(format!(
                "MAX_DETECT_BATCH_SIZE must be between 1 and {}",
                MAX_DETECT_BATCH_SIZE
            )));
        }
        if self.max_write_batch_size == 0 || self.max_write_batch_size > BULK_WRITE_CEILING {
            return Err(AnalyzerError::config(format!(
                "MAX_WRITE_BATCH_SIZE must be between 1 and {}",
                BULK_WRITE_CEILING
            )));
        }
        if self.max_write_attempts == 0 || self.max_extraction_attempts == 0 {
            return Err(AnalyzerError::config("retry attempts must be at least 1"));
        }
        if self.batch_concurrency == 0 {
            return Err(AnalyzerError::config("BATCH_CONCURRENCY must be at least 1"));
        }
        if self.allowed_extensions.is_empty() {
            return Err(AnalyzerError::config("ALLOWED_EXTENSIONS must not be empty"));
        }
        self.table_schema()
            .validate()
            .map_err(|reason| AnalyzerError::config(format!("Invalid TABLE_HASH/TABLE_RANGE: {}", reason)))?;
        Ok(())
    }

    pub fn table_schema(&self) -> TableSchema {
        TableSchema::new(&self.table_name, &self.hash_key_name, &self.range_key_name)
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            allowed_extensions: self.allowed_extensions.clone(),
            extraction_retry: self.retry_policy(self.max_extraction_attempts),
        }
    }

    pub fn detection_config(&self) -> DetectionConfig {
        DetectionConfig {
            batch_size: non_zero(self.max_detect_batch_size),
            language_code: self.language_code.clone(),
            concurrency: non_zero(self.batch_concurrency),
            retry: self.retry_policy(self.max_extraction_attempts),
        }
    }

    pub fn writer_config(&self) -> WriterConfig {
        WriterConfig {
            table: self.table_schema(),
            batch_size: non_zero(self.max_write_batch_size),
            concurrency: non_zero(self.batch_concurrency),
            retry: self.retry_policy(self.max_write_attempts),
        }
    }

    fn retry_policy(&self, max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, self.initial_retry_delay_ms, self.max_retry_delay_ms)
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, AnalyzerError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AnalyzerError::config(format!("Invalid {}: {}", key, e))),
        None => Ok(default),
    }
}

fn parse_extensions(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

fn non_zero(value: usize) -> NonZeroUsize {
    NonZeroUsize::new(value).unwrap_or(NonZeroUsize::MIN)
}
