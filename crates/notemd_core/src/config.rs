//! Store layout configuration and one-call bootstrap.
//!
//! # Responsibility
//! - Derive database, mirror, settings and log locations from one data dir.
//! - Open every persistence target the app needs.
//!
//! # Invariants
//! - All derived paths live under `data_dir`.
//! - Every repository built by one [`NoteStore`] shares its live feeds.

use crate::db::{open_db, DbError};
use crate::mirror::NoteFileStore;
use crate::repo::note_repo::{NoteFeeds, RepoResult, SqliteNoteRepository};
use crate::settings::{SettingsError, SettingsStore, ThemeSignal};
use log::info;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_DB_FILE_NAME: &str = "note_md_database.db";
const DEFAULT_MIRROR_DIR_NAME: &str = "notes";
const DEFAULT_SETTINGS_FILE_NAME: &str = "settings.json";
const DEFAULT_LOG_DIR_NAME: &str = "logs";

/// File layout under the app's private data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    #[serde(default = "default_db_file_name")]
    pub db_file_name: String,
    #[serde(default = "default_mirror_dir_name")]
    pub mirror_dir_name: String,
    #[serde(default = "default_settings_file_name")]
    pub settings_file_name: String,
}

fn default_db_file_name() -> String {
    DEFAULT_DB_FILE_NAME.to_string()
}

fn default_mirror_dir_name() -> String {
    DEFAULT_MIRROR_DIR_NAME.to_string()
}

fn default_settings_file_name() -> String {
    DEFAULT_SETTINGS_FILE_NAME.to_string()
}

impl StoreConfig {
    /// Default layout rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            db_file_name: default_db_file_name(),
            mirror_dir_name: default_mirror_dir_name(),
            settings_file_name: default_settings_file_name(),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file_name)
    }

    pub fn mirror_dir(&self) -> PathBuf {
        self.data_dir.join(&self.mirror_dir_name)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(&self.settings_file_name)
    }

    /// Suggested directory for [`crate::init_logging`].
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(DEFAULT_LOG_DIR_NAME)
    }
}

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Settings(SettingsError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Settings(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Settings(err) => Some(err),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<SettingsError> for StoreError {
    fn from(value: SettingsError) -> Self {
        Self::Settings(value)
    }
}

/// Opened persistence targets for one data directory.
pub struct NoteStore {
    config: StoreConfig,
    conn: Connection,
    feeds: Arc<NoteFeeds>,
    settings: SettingsStore,
}

impl NoteStore {
    pub fn open(config: StoreConfig, theme: Arc<dyn ThemeSignal>) -> Result<Self, StoreError> {
        let conn = open_db(config.db_path())?;
        let settings = SettingsStore::open(config.settings_path(), theme)?;
        info!(
            "event=store_open module=config status=ok data_dir={}",
            config.data_dir.display()
        );
        Ok(Self {
            config,
            conn,
            feeds: Arc::new(NoteFeeds::new()),
            settings,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Builds a note repository over the store's connection.
    ///
    /// All repositories from one store publish to the same subscribers.
    pub fn notes(&self) -> RepoResult<SqliteNoteRepository<'_>> {
        let repo =
            SqliteNoteRepository::try_new(&self.conn, NoteFileStore::new(self.config.mirror_dir()))?;
        Ok(repo.with_feeds(Arc::clone(&self.feeds)))
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
