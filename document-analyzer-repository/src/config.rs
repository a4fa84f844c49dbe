//! Configuration types for the bulk write sink.

/// Upper bound most bulk-write APIs accept in a single call.
pub const BULK_WRITE_CEILING: usize = 100;

/// Attribute holding the line text.
pub const TEXT_ATTRIBUTE: &str = "text";
/// Attribute holding the detected entities, when any.
pub const ENTITIES_ATTRIBUTE: &str = "entities";

/// Destination table and the attribute names of its composite key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Name of the table records are written to.
    pub table_name: String,
    /// Partition key attribute; holds the document key.
    pub hash_key_name: String,
    /// Sort key attribute; holds the line id.
    pub range_key_name: String,
}

impl TableSchema {
    pub fn new(
        table_name: impl Into<String>,
        hash_key_name: impl Into<String>,
        range_key_name: impl Into<String>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            hash_key_name: hash_key_name.into(),
            range_key_name: range_key_name.into(),
        }
    }

    /// Check that the key attributes are distinct and do not collide with
    /// the record's value attributes.
    pub fn validate(&self) -> Result<(), String> {
        if self.hash_key_name == self.range_key_name {
            return Err(format!(
                "hash and range key must differ, both are '{}'",
                self.hash_key_name
            ));
        }
        for key in [&self.hash_key_name, &self.range_key_name] {
            if key == TEXT_ATTRIBUTE || key == ENTITIES_ATTRIBUTE {
                return Err(format!("key attribute '{}' is reserved for record values", key));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_keys_are_valid() {
        assert!(TableSchema::new("analysis", "document", "line").validate().is_ok());
    }

    #[test]
    fn test_rejects_identical_keys() {
        let err = TableSchema::new("analysis", "id", "id").validate().unwrap_err();
        assert!(err.contains("must differ"));
    }

    #[test]
    fn test_rejects_keys_shadowing_values() {
        assert!(TableSchema::new("analysis", "text", "line").validate().is_err());
        assert!(TableSchema::new("analysis", "document", "entities").validate().is_err());
    }
}
