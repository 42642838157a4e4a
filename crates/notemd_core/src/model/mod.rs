//! Note domain model.
//!
//! # Responsibility
//! - Define the note record shared by the table, the mirror and callers.
//! - Own the tag text encoding stored in `notes.tags`.
//!
//! # Invariants
//! - `NoteId` 0 means "never persisted"; SQLite assigns the real id once.

pub mod note;
pub mod tags;
