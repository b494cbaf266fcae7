//! Schema migrations for the bookmark database.
//!
//! A `schema_version` table records which migrations have been applied.
//! Each migration runs exactly once.

use rusqlite::{params, Connection};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::bookmark::{BOOKMARKS_BAR_ID, OTHER_BOOKMARKS_ID, ROOT_ID};

/// Current schema version. Bump this when adding a new migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Returns the applied schema version (0 for a fresh database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Runs all pending migrations. Safe to call on every startup.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);

    if current < 1 {
        migration_v1(conn)?;
        record_version(conn, 1, "Bookmark node tree with permanent root folders")?;
    }

    Ok(())
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        params![version, now_millis() / 1000, description],
    )?;
    Ok(())
}

/// V1: the node table plus the synthetic root and its two permanent folders.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS bookmark_nodes (
            id TEXT PRIMARY KEY,
            parent_id TEXT,
            title TEXT NOT NULL,
            url TEXT,
            position INTEGER NOT NULL,
            date_added INTEGER NOT NULL,
            FOREIGN KEY (parent_id) REFERENCES bookmark_nodes(id)
        );

        CREATE INDEX IF NOT EXISTS idx_bookmark_nodes_parent
            ON bookmark_nodes(parent_id, position);
        ",
    )?;

    let now = now_millis();
    let seed = [
        (ROOT_ID, None, "", 0),
        (BOOKMARKS_BAR_ID, Some(ROOT_ID), "Bookmarks Bar", 0),
        (OTHER_BOOKMARKS_ID, Some(ROOT_ID), "Other Bookmarks", 1),
    ];
    for (id, parent_id, title, position) in seed {
        conn.execute(
            "INSERT OR IGNORE INTO bookmark_nodes (id, parent_id, title, url, position, date_added) \
             VALUES (?1, ?2, ?3, NULL, ?4, ?5)",
            params![id, parent_id, title, position, now],
        )?;
    }
    Ok(())
}
