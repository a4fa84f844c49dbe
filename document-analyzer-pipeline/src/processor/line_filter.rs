//! Line filter implementation.
//!
//! Keeps only `LINE` blocks that carry text, numbering them in output order.

use tracing::{debug, instrument};

use document_analyzer_shared::{BlockType, RawBlock, TextLine};

/// Selects the line blocks of an extraction result.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineFilter;

impl LineFilter {
    pub fn new() -> Self {
        Self
    }

    /// Filter raw blocks down to non-empty lines.
    ///
    /// Relative order is preserved and `ordinal_index` is the 0-based position
    /// in the returned sequence. Page, word and unknown blocks are dropped, as
    /// are lines whose text is absent or empty.
    #[instrument(skip(self, blocks), fields(block_count = blocks.len()))]
    pub fn filter(&self, blocks: Vec<RawBlock>) -> Vec<TextLine> {
        let lines: Vec<TextLine> = blocks
            .into_iter()
            .filter(|block| block.block_type == BlockType::Line)
            .filter_map(|block| match block.text {
                Some(text) if !text.is_empty() => Some((block.id, text)),
                _ => None,
            })
            .enumerate()
            .map(|(ordinal_index, (line_id, text))| TextLine::new(line_id, text, ordinal_index))
            .collect();

        debug!(line_count = lines.len(), "Filtered lines");
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_only_lines_with_text() {
        let blocks = vec![
            RawBlock::page("p1"),
            RawBlock::line("l1", "Invoice 42"),
            RawBlock::word("w1", "Invoice"),
            RawBlock::word("w2", "42"),
            RawBlock::new("l2", BlockType::Line, None),
            RawBlock::line("l3", ""),
            RawBlock::new("t1", BlockType::Other("TABLE".to_string()), Some("cell".to_string())),
            RawBlock::line("l4", "Total: $10"),
        ];

        let lines = LineFilter::new().filter(blocks);

        assert_eq!(
            lines,
            vec![
                TextLine::new("l1", "Invoice 42", 0),
                TextLine::new("l4", "Total: $10", 1),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(LineFilter::new().filter(Vec::new()).is_empty());
    }

    #[test]
    fn test_ordinal_index_is_contiguous() {
        let blocks: Vec<RawBlock> = (0..10)
            .flat_map(|i| {
                vec![
                    RawBlock::word(format!("w{}", i), "x"),
                    RawBlock::line(format!("l{}", i), format!("line {}", i)),
                ]
            })
            .collect();

        let lines = LineFilter::new().filter(blocks);

        assert_eq!(lines.len(), 10);
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(line.ordinal_index, i);
            assert_eq!(line.line_id, format!("l{}", i));
        }
    }
}
