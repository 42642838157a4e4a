//! Core logic for NoteMD.
//!
//! Two independent parts live here: the note store (SQLite table, JSON file
//! mirror, live subscriptions, theme preference) and the token practice
//! board (drag-and-drop sorter with a SHA-1 digest).

pub mod clock;
pub mod config;
pub mod db;
pub mod feed;
mod io_atomic;
pub mod logging;
pub mod mirror;
pub mod model;
pub mod repo;
pub mod service;
pub mod settings;
pub mod tokens;

pub use clock::{Clock, SteppingClock, SystemClock};
pub use config::{NoteStore, StoreConfig, StoreError};
pub use feed::{Publisher, Subscription};
pub use logging::{default_log_level, init_logging, logging_status};
pub use mirror::{MirrorError, MirrorResult, NoteFileStore};
pub use model::note::{Note, NoteId, UNSAVED_NOTE_ID};
pub use model::tags::{decode_tags, encode_tags, normalize_tags};
pub use repo::note_repo::{
    NoteFeeds, NoteRepository, RepoError, RepoResult, SqliteNoteRepository,
};
pub use service::note_service::{previews, EditorError, NoteDraft, NoteEditor, NotePreview};
pub use settings::{
    PlatformTheme, SettingsError, SettingsResult, SettingsStore, ThemeSignal, DARK_MODE_KEY,
};
pub use tokens::board::{DragOutcome, TokenBoard};
pub use tokens::drag::DragGesture;
pub use tokens::geometry::{Offset, Rect};
pub use tokens::sorter::{TokenError, TokenSorter};
pub use tokens::{Zone, DEFAULT_TOKENS};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
