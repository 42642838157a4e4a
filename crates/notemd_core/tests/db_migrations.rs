use notemd_core::db::migrations::latest_version;
use notemd_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_notes_table() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    let columns = table_columns(&conn, "notes");
    assert_eq!(
        columns,
        vec!["id", "title", "content", "tags", "lastUpdated"]
    );
}

#[test]
fn opening_same_database_twice_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("notes.db");

    let conn = open_db(&path).unwrap();
    conn.execute(
        "INSERT INTO notes (title, content, tags, lastUpdated) VALUES ('t', 'c', '[]', 1);",
        [],
    )
    .unwrap();
    drop(conn);

    let reopened = open_db(&path).unwrap();
    assert_eq!(schema_version(&reopened), latest_version());
    let count: i64 = reopened
        .query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn ids_are_never_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO notes (title, content, tags, lastUpdated) VALUES ('a', '', '[]', 1);",
        [],
    )
    .unwrap();
    let first = conn.last_insert_rowid();
    conn.execute("DELETE FROM notes WHERE id = ?1;", [first]).unwrap();
    conn.execute(
        "INSERT INTO notes (title, content, tags, lastUpdated) VALUES ('b', '', '[]', 2);",
        [],
    )
    .unwrap();
    assert!(conn.last_insert_rowid() > first);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});")).unwrap();
    let mut rows = stmt.query([]).unwrap();
    let mut columns = Vec::new();
    while let Some(row) = rows.next().unwrap() {
        let name: String = row.get(1).unwrap();
        columns.push(name);
    }
    columns
}
