//! # Document Analyzer Pipeline
//!
//! This crate provides the stages that turn an uploaded document into
//! persisted, entity-annotated lines of text.
//!
//! ## Architecture
//!
//! Each document runs through the stages strictly in order:
//!
//! 1. **Extraction**: Blocks are read from the text extraction service
//! 2. **Processor**: Blocks are filtered down to non-empty lines
//! 3. **Detection**: Line texts are sent to entity detection in batches
//! 4. **Correlator**: Per-batch results are joined back to their lines
//! 5. **Processor**: Lines and entities are assembled into records
//! 6. **Loader**: Records are bulk written, retrying unprocessed items
//! 7. **Orchestrator**: Drives the stages and reports the outcome

pub mod batcher;
pub mod correlator;
pub mod detection;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod retry;

pub use errors::{FailureKind, PipelineError};
pub use orchestrator::{Orchestrator, OrchestratorConfig, ProcessOutcome};
