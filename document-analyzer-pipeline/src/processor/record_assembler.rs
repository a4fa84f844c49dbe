//! Record assembler implementation.

use document_analyzer_shared::{AnalyzedLine, EntityMention, TextLine};

/// Builds the persisted record for a line.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordAssembler;

impl RecordAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Merge a line with its correlated entities.
    ///
    /// An empty entity list becomes `None` so the attribute is left out of
    /// storage entirely.
    pub fn assemble(&self, document_key: &str, line: &TextLine, entities: Vec<EntityMention>) -> AnalyzedLine {
        AnalyzedLine {
            document_key: document_key.to_string(),
            line_id: line.line_id.clone(),
            text: line.text.clone(),
            entities: if entities.is_empty() { None } else { Some(entities) },
        }
    }

    /// Assemble every line with the entity list at the same position.
    pub fn assemble_all(
        &self,
        document_key: &str,
        lines: &[TextLine],
        entities: Vec<Vec<EntityMention>>,
    ) -> Vec<AnalyzedLine> {
        debug_assert_eq!(lines.len(), entities.len());

        lines
            .iter()
            .zip(entities)
            .map(|(line, entities)| self.assemble(document_key, line, entities))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_entities_are_absent() {
        let line = TextLine::new("l1", "nothing here", 0);
        let record = RecordAssembler::new().assemble("doc.png", &line, Vec::new());

        assert_eq!(record.document_key, "doc.png");
        assert_eq!(record.line_id, "l1");
        assert_eq!(record.text, "nothing here");
        assert!(record.entities.is_none());
    }

    #[test]
    fn test_entities_are_kept_in_order() {
        let line = TextLine::new("l1", "Jane Doe visited Paris", 0);
        let entities = vec![
            EntityMention::new("Jane Doe", "PERSON", 0.99),
            EntityMention::new("Paris", "LOCATION", 0.97),
        ];

        let record = RecordAssembler::new().assemble("doc.png", &line, entities.clone());
        assert_eq!(record.entities, Some(entities));
    }

    #[test]
    fn test_assemble_all_pairs_by_position() {
        let lines = vec![TextLine::new("a", "one", 0), TextLine::new("b", "two", 1)];
        let entities = vec![Vec::new(), vec![EntityMention::new("two", "QUANTITY", 0.8)]];

        let records = RecordAssembler::new().assemble_all("doc.pdf", &lines, entities);

        assert_eq!(records.len(), 2);
        assert!(records[0].entities.is_none());
        assert_eq!(records[1].line_id, "b");
        assert_eq!(records[1].entities.as_ref().map(Vec::len), Some(1));
    }
}
