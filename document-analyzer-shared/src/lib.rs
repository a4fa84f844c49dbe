//! # Document Analyzer Shared
//!
//! Plain data types that flow between the document analyzer crates.
//!
//! Data moves strictly in one direction:
//! `DocumentReference` -> `RawBlock` -> `TextLine` (+ `EntityMention`) -> `AnalyzedLine`.

mod block;
mod document;
mod line;

pub use block::{BlockType, RawBlock};
pub use document::DocumentReference;
pub use line::{AnalyzedLine, EntityMention, RecordKey, TextLine};
