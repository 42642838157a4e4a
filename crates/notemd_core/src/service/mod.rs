//! Use-case layer over the repository.
//!
//! # Responsibility
//! - Editor save/delete rules and list preview projection.
//! - Keep UI code free of storage details.

pub mod note_service;
