//! # Document Analyzer Repository
//!
//! This crate provides the traits for the three external services the
//! analyzer depends on (text extraction, entity detection, bulk writes),
//! their error types, and concrete implementations backed by Textract,
//! Comprehend and DynamoDB.

pub mod aws;
pub mod config;
pub mod errors;
pub mod interfaces;

pub use aws::{ComprehendDetector, DynamoDbSink, TextractExtractor};
pub use config::TableSchema;
pub use errors::{DetectionError, ExtractionError, SinkError};
pub use interfaces::{BulkWriteSink, DetectionResult, EntityDetector, TextExtractor};
