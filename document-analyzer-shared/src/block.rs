//! Raw structural blocks returned by text extraction.

use serde::{Deserialize, Serialize};

/// Kind of structural unit a block represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockType {
    Page,
    Line,
    Word,
    /// Any block kind the analyzer does not use (tables, key-value sets, ...).
    Other(String),
}

impl BlockType {
    /// Parse the wire name used by the extraction service.
    pub fn from_wire(name: &str) -> Self {
        match name {
            "PAGE" => Self::Page,
            "LINE" => Self::Line,
            "WORD" => Self::Word,
            other => Self::Other(other.to_string()),
        }
    }
}

/// One block as delivered by the extraction collaborator, before filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    /// Opaque, service-assigned identifier.
    pub id: String,
    pub block_type: BlockType,
    pub text: Option<String>,
}

impl RawBlock {
    pub fn new(id: impl Into<String>, block_type: BlockType, text: Option<String>) -> Self {
        Self {
            id: id.into(),
            block_type,
            text,
        }
    }

    /// Convenience constructor for a `LINE` block with text.
    pub fn line(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, BlockType::Line, Some(text.into()))
    }

    /// Convenience constructor for a `WORD` block with text.
    pub fn word(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, BlockType::Word, Some(text.into()))
    }

    /// Convenience constructor for a `PAGE` block, which never carries text.
    pub fn page(id: impl Into<String>) -> Self {
        Self::new(id, BlockType::Page, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_type_from_wire() {
        assert_eq!(BlockType::from_wire("LINE"), BlockType::Line);
        assert_eq!(BlockType::from_wire("WORD"), BlockType::Word);
        assert_eq!(BlockType::from_wire("PAGE"), BlockType::Page);
        assert_eq!(
            BlockType::from_wire("TABLE"),
            BlockType::Other("TABLE".to_string())
        );
    }
}
