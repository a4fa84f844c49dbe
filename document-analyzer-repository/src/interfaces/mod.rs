//! Interface definitions for the external collaborators.
//!
//! Each collaborator sits behind an async trait so the pipeline can be wired
//! against AWS in production and against in-memory mocks in tests.

mod bulk_write_sink;
mod entity_detector;
mod text_extractor;

pub use bulk_write_sink::BulkWriteSink;
pub use entity_detector::{DetectionResult, EntityDetector};
pub use text_extractor::TextExtractor;
