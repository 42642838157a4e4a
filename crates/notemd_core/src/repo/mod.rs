//! Note persistence.
//!
//! # Responsibility
//! - Define the note repository contract used by editor/list use-cases.
//! - Keep SQL and mirror-file details out of callers.
//!
//! # Invariants
//! - The repository is the sole writer of the `notes` table and the mirror.
//! - Missing ids read as `None`, never as an error.

pub mod note_repo;
