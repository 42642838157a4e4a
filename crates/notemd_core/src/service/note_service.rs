//! Note editor and list use-cases.
//!
//! # Responsibility
//! - Hold editor draft state and decide when a draft may be saved.
//! - Derive list previews (display title, summary) from stored notes.
//!
//! # Invariants
//! - A draft is saveable only when title or content has non-blank text.
//! - Saved title and content are trimmed.
//! - Once a draft is saved it keeps the assigned id for later saves.

use crate::model::note::{Note, NoteId, UNSAVED_NOTE_ID};
use crate::repo::note_repo::{NoteRepository, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

const SUMMARY_MAX_CHARS: usize = 160;
const TITLE_MAX_CHARS: usize = 32;

#[derive(Debug)]
pub enum EditorError {
    /// Title and content are both blank.
    NothingToSave,
    /// Delete requested on a draft that was never saved.
    NotEditing,
    Repo(RepoError),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NothingToSave => write!(f, "note has no title or content to save"),
            Self::NotEditing => write!(f, "note has not been saved yet"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for EditorError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Editable copy of one note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub note_id: Option<NoteId>,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl NoteDraft {
    pub fn from_note(note: &Note) -> Self {
        Self {
            note_id: note.is_persisted().then_some(note.id),
            title: note.title.clone(),
            content: note.content.clone(),
            tags: note.tags.clone(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.note_id.is_some()
    }

    pub fn can_save(&self) -> bool {
        !self.title.trim().is_empty() || !self.content.trim().is_empty()
    }

    /// Note to hand to the repository; title and content trimmed.
    pub fn to_note(&self) -> Note {
        Note {
            id: self.note_id.unwrap_or(UNSAVED_NOTE_ID),
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
            tags: self.tags.clone(),
            last_updated: 0,
        }
    }
}

/// Editor session over a repository.
pub struct NoteEditor<'r, R: NoteRepository> {
    repo: &'r R,
    draft: NoteDraft,
}

impl<'r, R: NoteRepository> NoteEditor<'r, R> {
    /// Starts an empty draft.
    pub fn new(repo: &'r R) -> Self {
        Self {
            repo,
            draft: NoteDraft::default(),
        }
    }

    /// Opens `id` for editing. An unknown id yields an empty draft that
    /// still targets `id`, so saving recreates it.
    pub fn load(repo: &'r R, id: NoteId) -> Result<Self, EditorError> {
        let draft = match repo.get(id)? {
            Some(note) => NoteDraft::from_note(&note),
            None => NoteDraft {
                note_id: Some(id),
                ..NoteDraft::default()
            },
        };
        Ok(Self { repo, draft })
    }

    pub fn draft(&self) -> &NoteDraft {
        &self.draft
    }

    pub fn set_title(&mut self, value: impl Into<String>) {
        self.draft.title = value.into();
    }

    pub fn set_content(&mut self, value: impl Into<String>) {
        self.draft.content = value.into();
    }

    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.draft.tags = tags.into_iter().map(Into::into).collect();
    }

    /// Upserts the draft and returns the note id.
    pub fn save(&mut self) -> Result<NoteId, EditorError> {
        if !self.draft.can_save() {
            return Err(EditorError::NothingToSave);
        }
        let id = self.repo.upsert(&self.draft.to_note())?;
        self.draft.note_id.get_or_insert(id);
        Ok(id)
    }

    /// Deletes the edited note and clears the draft.
    pub fn delete(&mut self) -> Result<(), EditorError> {
        let id = self.draft.note_id.ok_or(EditorError::NotEditing)?;
        self.repo.delete(id)?;
        info!("event=editor_delete module=service status=ok id={id}");
        self.draft = NoteDraft::default();
        Ok(())
    }
}

/// List row projection of a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePreview {
    pub id: NoteId,
    /// Title, or the start of the summary when the title is blank.
    pub title: String,
    /// First non-blank content line, or the first 160 chars of content.
    pub summary: String,
    pub body: String,
    pub tags: Vec<String>,
    pub last_updated: i64,
}

impl NotePreview {
    pub fn from_note(note: &Note) -> Self {
        let summary = note
            .content
            .lines()
            .find(|line| !line.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| take_chars(&note.content, SUMMARY_MAX_CHARS));
        let title = if note.title.trim().is_empty() {
            take_chars(&summary, TITLE_MAX_CHARS)
        } else {
            note.title.clone()
        };
        Self {
            id: note.id,
            title,
            summary,
            body: note.content.clone(),
            tags: note.tags.clone(),
            last_updated: note.last_updated,
        }
    }
}

/// Maps a list emission to preview rows, preserving order.
pub fn previews(notes: &[Note]) -> Vec<NotePreview> {
    notes.iter().map(NotePreview::from_note).collect()
}

fn take_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
