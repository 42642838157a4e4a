//! Note record.

use serde::{Deserialize, Serialize};

/// Row identifier assigned by SQLite. `0` marks an unsaved note.
pub type NoteId = i64;

/// Identifier carried by notes that were never written.
pub const UNSAVED_NOTE_ID: NoteId = 0;

/// One user note.
///
/// Serialized with the mirror-file key names (`lastUpdated`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    /// User-entered order, not sorted.
    pub tags: Vec<String>,
    /// Epoch milliseconds, stamped by the repository on every write.
    pub last_updated: i64,
}

impl Note {
    /// Builds an unsaved note. `last_updated` is left at 0 until upsert.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: UNSAVED_NOTE_ID,
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
            last_updated: 0,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Returns whether this note has been assigned a row id.
    pub fn is_persisted(&self) -> bool {
        self.id != UNSAVED_NOTE_ID
    }
}
