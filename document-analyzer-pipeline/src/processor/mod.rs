//! Processor module for the document analyzer pipeline.
//!
//! Pure transformations: raw blocks into lines, and lines plus entities
//! into persistable records.

mod line_filter;
mod record_assembler;

pub use line_filter::LineFilter;
pub use record_assembler::RecordAssembler;
