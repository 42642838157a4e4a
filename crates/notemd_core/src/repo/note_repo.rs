//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Own every write to the `notes` table and its JSON file mirror.
//! - Serve one-shot reads and live subscriptions over the table.
//!
//! # Invariants
//! - `upsert` performs exactly one table write, then at most one mirror
//!   write, and only after the table write succeeded with a non-zero id.
//! - Deleting a missing id is a no-op for both targets.
//! - Live queries are refreshed after every committed table write, even when
//!   the mirror write that follows fails; subscribers see a new value only
//!   when the query result actually changed.
//! - Subscribing re-queries the table, so the replayed value is never stale.
//! - Repositories sharing one [`NoteFeeds`] publish to the same subscribers.
//! - Table and mirror are not written in one transaction. A crash or mirror
//!   failure between the two writes leaves them diverged until
//!   [`SqliteNoteRepository::rebuild_mirror`] runs.

use crate::clock::{Clock, SystemClock};
use crate::db::DbError;
use crate::feed::{Publisher, Subscription};
use crate::mirror::{MirrorError, NoteFileStore};
use crate::model::note::{Note, NoteId};
use crate::model::tags::{decode_tags, encode_tags, normalize_tags};
use log::{debug, error, info};
use once_cell::sync::OnceCell;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::{BTreeSet, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

const NOTE_SELECT_SQL: &str = "SELECT id, title, content, tags, lastUpdated FROM notes";
const REQUIRED_COLUMNS: [&str; 5] = ["id", "title", "content", "tags", "lastUpdated"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository failure. Storage errors are surfaced as-is, never retried.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Mirror(MirrorError),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Mirror(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing; was the database migrated?")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Mirror(err) => Some(err),
            Self::MissingRequiredTable(_) | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<MirrorError> for RepoError {
    fn from(value: MirrorError) -> Self {
        Self::Mirror(value)
    }
}

/// Read and write contract consumed by list/editor use-cases.
pub trait NoteRepository {
    /// Subscribes to all notes, newest `last_updated` first.
    fn list(&self) -> RepoResult<Subscription<Vec<Note>>>;
    /// Subscribes to one note; emits `None` while it does not exist.
    fn observe(&self, id: NoteId) -> RepoResult<Subscription<Option<Note>>>;
    /// Fetches one note.
    fn get(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Stamps, stores and mirrors `note`; returns its row id.
    fn upsert(&self, note: &Note) -> RepoResult<NoteId>;
    /// Removes one note and its mirror file.
    fn delete(&self, id: NoteId) -> RepoResult<()>;
    /// Removes every note and mirror file; returns the number of rows removed.
    fn delete_all(&self) -> RepoResult<usize>;
}

enum Change {
    One(NoteId),
    All,
}

/// Live query publishers for one database.
///
/// Share one instance between every repository opened over the same
/// connection so a write through any of them reaches all subscribers.
#[derive(Default)]
pub struct NoteFeeds {
    list: OnceCell<Publisher<Vec<Note>>>,
    notes: Mutex<HashMap<NoteId, Publisher<Option<Note>>>>,
}

impl NoteFeeds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of single-note feeds currently held.
    pub fn observed_count(&self) -> usize {
        self.lock_notes().len()
    }

    fn list_feed(&self) -> &Publisher<Vec<Note>> {
        self.list.get_or_init(|| Publisher::new(Vec::new()))
    }

    fn lock_notes(&self) -> MutexGuard<'_, HashMap<NoteId, Publisher<Option<Note>>>> {
        self.notes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// SQLite table + file mirror repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
    mirror: NoteFileStore,
    clock: Arc<dyn Clock>,
    feeds: Arc<NoteFeeds>,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Builds a repository over a migrated connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when `conn` was not
    ///   opened through [`crate::db::open_db`] or is from an unknown schema.
    pub fn try_new(conn: &'conn Connection, mirror: NoteFileStore) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self {
            conn,
            mirror,
            clock: Arc::new(SystemClock),
            feeds: Arc::new(NoteFeeds::new()),
        })
    }

    /// Publishes through `feeds` instead of a private set.
    ///
    /// `feeds` must only be shared with repositories over the same database.
    pub fn with_feeds(mut self, feeds: Arc<NoteFeeds>) -> Self {
        self.feeds = feeds;
        self
    }

    /// Replaces the timestamp source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn mirror(&self) -> &NoteFileStore {
        &self.mirror
    }

    /// Rewrites every mirror file from the table and removes orphans.
    ///
    /// Returns `(written, removed)` file counts.
    pub fn rebuild_mirror(&self) -> RepoResult<(usize, usize)> {
        let notes = self.query_all()?;
        let live: BTreeSet<NoteId> = notes.iter().map(|note| note.id).collect();

        let mut written = 0;
        for note in &notes {
            if self.mirror.write(note)? {
                written += 1;
            }
        }

        let mut removed = 0;
        for id in self.mirror.ids()? {
            if !live.contains(&id) && self.mirror.delete(id)? {
                removed += 1;
            }
        }

        info!("event=mirror_rebuild module=repo status=ok written={written} removed={removed}");
        Ok((written, removed))
    }

    fn query_all(&self) -> RepoResult<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} ORDER BY lastUpdated DESC, id DESC;"))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn query_one(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let note = self
            .conn
            .query_row(
                &format!("{NOTE_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_note_row,
            )
            .optional()?;
        Ok(note)
    }

    fn write_row(&self, note: &Note, tags_text: &str) -> RepoResult<NoteId> {
        if note.is_persisted() {
            self.conn.execute(
                "INSERT INTO notes (id, title, content, tags, lastUpdated)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    content = excluded.content,
                    tags = excluded.tags,
                    lastUpdated = excluded.lastUpdated;",
                params![
                    note.id,
                    note.title.as_str(),
                    note.content.as_str(),
                    tags_text,
                    note.last_updated,
                ],
            )?;
            Ok(note.id)
        } else {
            self.conn.execute(
                "INSERT INTO notes (title, content, tags, lastUpdated)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    note.title.as_str(),
                    note.content.as_str(),
                    tags_text,
                    note.last_updated,
                ],
            )?;
            Ok(self.conn.last_insert_rowid())
        }
    }

    fn refresh(&self, change: Change) -> RepoResult<()> {
        if let Some(feed) = self.feeds.list.get() {
            feed.publish(self.query_all()?);
        }

        let ids: Vec<NoteId> = {
            let feeds = self.feeds.lock_notes();
            match change {
                Change::One(id) if feeds.contains_key(&id) => vec![id],
                Change::One(_) => Vec::new(),
                Change::All => feeds.keys().copied().collect(),
            }
        };
        for id in ids {
            let value = self.query_one(id)?;
            let mut feeds = self.feeds.lock_notes();
            if let Some(feed) = feeds.get(&id) {
                feed.publish(value);
                if feed.subscriber_count() == 0 {
                    feeds.remove(&id);
                }
            }
        }
        Ok(())
    }

    /// Refreshes after a committed table write, then reports the first failure.
    fn finish_write<T>(&self, change: Change, mirror_result: RepoResult<T>) -> RepoResult<T> {
        let refreshed = self.refresh(change);
        let value = mirror_result?;
        refreshed?;
        Ok(value)
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn list(&self) -> RepoResult<Subscription<Vec<Note>>> {
        let notes = self.query_all()?;
        let feed = self.feeds.list_feed();
        feed.publish(notes);
        Ok(feed.subscribe())
    }

    fn observe(&self, id: NoteId) -> RepoResult<Subscription<Option<Note>>> {
        let value = self.query_one(id)?;
        let mut feeds = self.feeds.lock_notes();
        feeds.retain(|_, feed| feed.subscriber_count() > 0);
        let feed = feeds.entry(id).or_insert_with(|| Publisher::new(None));
        feed.publish(value);
        Ok(feed.subscribe())
    }

    fn get(&self, id: NoteId) -> RepoResult<Option<Note>> {
        self.query_one(id)
    }

    fn upsert(&self, note: &Note) -> RepoResult<NoteId> {
        let started_at = Instant::now();
        let mode = if note.is_persisted() { "update" } else { "insert" };
        let stamped = Note {
            tags: normalize_tags(&note.tags),
            last_updated: self.clock.now_millis(),
            ..note.clone()
        };
        let tags_text = encode_tags(&stamped.tags);

        let id = self.write_row(&stamped, &tags_text).map_err(|err| {
            error!("event=note_upsert module=repo status=error mode={mode} stage=table error={err}");
            err
        })?;

        let stored = Note { id, ..stamped };
        let mirrored = self.mirror.write(&stored).map_err(|err| {
            error!("event=note_upsert module=repo status=error mode={mode} stage=mirror id={id} error={err}");
            RepoError::from(err)
        });
        let mirrored = self.finish_write(Change::One(id), mirrored)?;

        info!(
            "event=note_upsert module=repo status=ok mode={mode} id={id} tags={} mirrored={mirrored} duration_ms={}",
            stored.tags.len(),
            started_at.elapsed().as_millis()
        );
        Ok(id)
    }

    fn delete(&self, id: NoteId) -> RepoResult<()> {
        let removed_rows = self.conn.execute("DELETE FROM notes WHERE id = ?1;", [id])?;
        let removed_file = self.mirror.delete(id).map_err(RepoError::from);
        let removed_file = if removed_rows > 0 {
            self.finish_write(Change::One(id), removed_file)?
        } else {
            removed_file?
        };
        info!(
            "event=note_delete module=repo status=ok id={id} rows={removed_rows} mirror_removed={removed_file}"
        );
        Ok(())
    }

    fn delete_all(&self) -> RepoResult<usize> {
        let mirrored = self.mirror.ids()?;
        let removed_rows = self.conn.execute("DELETE FROM notes;", [])?;
        let cleared = mirrored
            .into_iter()
            .try_for_each(|id| self.mirror.delete(id).map(|_| ()))
            .map_err(RepoError::from);
        self.finish_write(Change::All, cleared)?;
        info!("event=note_delete_all module=repo status=ok rows={removed_rows}");
        Ok(removed_rows)
    }
}

fn parse_note_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    let tags_text: String = row.get("tags")?;
    Ok(Note {
        id: row.get("id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        tags: decode_tags(&tags_text),
        last_updated: row.get("lastUpdated")?,
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, "notes")? {
        return Err(RepoError::MissingRequiredTable("notes"));
    }
    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "notes", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "notes",
                column,
            });
        }
    }
    debug!("event=repo_ready module=repo status=ok table=notes");
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
