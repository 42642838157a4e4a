//! JSON file mirror of persisted notes.
//!
//! # Responsibility
//! - Write one `<id>.json` snapshot per persisted note for out-of-band inspection.
//! - Remove the snapshot when its note is deleted.
//!
//! # Invariants
//! - Notes with id 0 are never mirrored.
//! - The app never reads mirror files back; [`NoteFileStore::read`] exists
//!   for inspection tooling and tests.
//! - Files are replaced atomically, so a reader never sees half a note.

use crate::io_atomic::{remove_if_exists, write_atomic};
use crate::model::note::{Note, NoteId};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const MIRROR_EXTENSION: &str = "json";

pub type MirrorResult<T> = Result<T, MirrorError>;

/// Mirror file failure.
#[derive(Debug)]
pub enum MirrorError {
    Io { path: PathBuf, source: std::io::Error },
    Json(serde_json::Error),
}

impl Display for MirrorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "mirror file `{}` failed: {source}", path.display())
            }
            Self::Json(err) => write!(f, "mirror json failed: {err}"),
        }
    }
}

impl Error for MirrorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for MirrorError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Directory of per-note JSON snapshots.
#[derive(Debug, Clone)]
pub struct NoteFileStore {
    dir: PathBuf,
}

impl NoteFileStore {
    /// Uses `dir` as the mirror directory. The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the snapshot for `id`, whether or not it exists.
    pub fn path_for(&self, id: NoteId) -> PathBuf {
        self.dir.join(format!("{id}.{MIRROR_EXTENSION}"))
    }

    /// Writes the snapshot for `note`.
    ///
    /// Returns `false` without touching disk when the note was never persisted.
    pub fn write(&self, note: &Note) -> MirrorResult<bool> {
        if !note.is_persisted() {
            return Ok(false);
        }
        let path = self.path_for(note.id);
        let bytes = serde_json::to_vec_pretty(note)?;
        write_atomic(&path, &bytes).map_err(|source| MirrorError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(
            "event=mirror_write module=mirror status=ok id={} bytes={}",
            note.id,
            bytes.len()
        );
        Ok(true)
    }

    /// Deletes the snapshot for `id`; returns whether one existed.
    pub fn delete(&self, id: NoteId) -> MirrorResult<bool> {
        let path = self.path_for(id);
        let removed =
            remove_if_exists(&path).map_err(|source| MirrorError::Io { path, source })?;
        debug!("event=mirror_delete module=mirror status=ok id={id} removed={removed}");
        Ok(removed)
    }

    /// Reads one snapshot back. `None` when no file exists.
    pub fn read(&self, id: NoteId) -> MirrorResult<Option<Note>> {
        let path = self.path_for(id);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(MirrorError::Io { path, source }),
        }
    }

    /// Lists ids that currently have a snapshot, ascending.
    pub fn ids(&self) -> MirrorResult<Vec<NoteId>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(MirrorError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| MirrorError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(MIRROR_EXTENSION) {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<NoteId>().ok())
            {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }
}
