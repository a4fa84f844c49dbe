//! Line-level types: filtered lines, detected entities and persisted records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One filtered line of extracted text.
///
/// `ordinal_index` is the position in the filtered sequence and is the key
/// used to join entity-detection results back to the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLine {
    pub line_id: String,
    pub text: String,
    pub ordinal_index: usize,
}

impl TextLine {
    pub fn new(line_id: impl Into<String>, text: impl Into<String>, ordinal_index: usize) -> Self {
        Self {
            line_id: line_id.into(),
            text: text.into(),
            ordinal_index,
        }
    }
}

/// A named entity detected in a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMention {
    pub text: String,
    pub entity_type: String,
    /// Confidence in `[0, 1]`.
    pub confidence_score: f32,
}

impl EntityMention {
    /// Create a mention, clamping the score into `[0, 1]`.
    pub fn new(text: impl Into<String>, entity_type: impl Into<String>, confidence_score: f32) -> Self {
        Self {
            text: text.into(),
            entity_type: entity_type.into(),
            confidence_score: confidence_score.clamp(0.0, 1.0),
        }
    }
}

/// The persisted unit: one per surviving `TextLine`.
///
/// `entities` is `None` when detection found nothing; the attribute is then
/// omitted from storage rather than written as an empty list. Storage does
/// not distinguish "not checked" from "checked, none found".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedLine {
    pub document_key: String,
    pub line_id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<EntityMention>>,
}

impl AnalyzedLine {
    /// Composite storage key of this record.
    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.document_key, &self.line_id)
    }
}

/// Composite `(document_key, line_id)` key of a persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    pub document_key: String,
    pub line_id: String,
}

impl RecordKey {
    pub fn new(document_key: impl Into<String>, line_id: impl Into<String>) -> Self {
        Self {
            document_key: document_key.into(),
            line_id: line_id.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.document_key, self.line_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_score_is_clamped() {
        assert_eq!(EntityMention::new("a", "PERSON", 1.7).confidence_score, 1.0);
        assert_eq!(EntityMention::new("a", "PERSON", -0.2).confidence_score, 0.0);
        assert_eq!(EntityMention::new("a", "PERSON", 0.42).confidence_score, 0.42);
    }

    #[test]
    fn test_analyzed_line_omits_absent_entities() {
        let line = AnalyzedLine {
            document_key: "doc.pdf".to_string(),
            line_id: "l-1".to_string(),
            text: "hello".to_string(),
            entities: None,
        };

        let json = serde_json::to_value(&line).unwrap();
        assert!(json.get("entities").is_none());
        assert_eq!(line.key(), RecordKey::new("doc.pdf", "l-1"));
    }

    #[test]
    fn test_record_key_display() {
        assert_eq!(RecordKey::new("doc.pdf", "l-1").to_string(), "doc.pdf#l-1");
    }
}
