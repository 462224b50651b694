//! Connection readiness checks shared by SQLite repositories.

use super::{RepoError, RepoResult};
use crate::db::migrations::latest_version;
use rusqlite::Connection;

/// Table name with the columns a repository reads or writes.
pub(crate) type TableShape = (&'static str, &'static [&'static str]);

pub(crate) const FILM_TABLES: &[TableShape] = &[
    (
        "films",
        &["id", "name", "description", "release_date", "duration", "mpa_id"],
    ),
    ("film_genres", &["film_id", "genre_id"]),
    ("likes", &["film_id", "user_id"]),
    ("mpa", &["id", "name", "description"]),
    ("genres", &["id", "name"]),
];

pub(crate) const USER_TABLES: &[TableShape] = &[
    ("users", &["id", "email", "login", "name", "birthday"]),
    ("friends", &["user_id", "friend_id", "is_confirmed"]),
];

pub(crate) const REFERENCE_TABLES: &[TableShape] = &[
    ("mpa", &["id", "name", "description"]),
    ("genres", &["id", "name"]),
];

/// Rejects connections not bootstrapped through `db::open_db*`.
pub(crate) fn ensure_connection_ready(conn: &Connection, tables: &[TableShape]) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

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

/// Returns whether a row with `id` exists in `table`.
pub(crate) fn row_exists(conn: &Connection, table: &'static str, id: i64) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1);"),
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
