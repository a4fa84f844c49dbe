//! Error types for the collaborator interfaces.

mod detection_error;
mod extraction_error;
mod sink_error;

pub use detection_error::DetectionError;
pub use extraction_error::ExtractionError;
pub use sink_error::SinkError;
