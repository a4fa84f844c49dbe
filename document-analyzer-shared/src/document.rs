//! Source document identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the document that triggered an invocation.
///
/// Created once from the trigger event and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentReference {
    /// The container (bucket) holding the document.
    pub container_id: String,
    /// The decoded object key within the container.
    pub object_key: String,
}

impl DocumentReference {
    /// Create a new document reference.
    pub fn new(container_id: impl Into<String>, object_key: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            object_key: object_key.into(),
        }
    }

    /// The key every persisted line of this document is partitioned under.
    pub fn document_key(&self) -> &str {
        &self.object_key
    }

    /// Lower-cased suffix after the last `.` in the object key.
    ///
    /// Returns `None` when the key has no `.` at all. A trailing `.` yields
    /// `Some("")`, which no allow-list accepts.
    pub fn extension(&self) -> Option<String> {
        self.object_key
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
    }
}

impl fmt::Display for DocumentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container_id, self.object_key)
    }
}
