//! Read-only access to seeded MPA ratings and genres.

use super::schema::{ensure_connection_ready, REFERENCE_TABLES};
use super::RepoResult;
use crate::model::reference::{Genre, GenreId, Mpa, MpaId};
use rusqlite::{Connection, OptionalExtension};

/// Repository interface for fixed reference data.
pub trait ReferenceRepository {
    /// Lists MPA ratings ordered by id.
    fn list_mpa(&self) -> RepoResult<Vec<Mpa>>;
    fn find_mpa(&self, id: MpaId) -> RepoResult<Option<Mpa>>;
    /// Lists genres ordered by id.
    fn list_genres(&self) -> RepoResult<Vec<Genre>>;
    fn find_genre(&self, id: GenreId) -> RepoResult<Option<Genre>>;
}

/// SQLite-backed reference repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteReferenceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReferenceRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REFERENCE_TABLES)?;
        Ok(Self { conn })
    }
}

impl ReferenceRepository for SqliteReferenceRepository<'_> {
    fn list_mpa(&self) -> RepoResult<Vec<Mpa>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, description FROM mpa ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(Mpa {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
            });
        }
        Ok(items)
    }

    fn find_mpa(&self, id: MpaId) -> RepoResult<Option<Mpa>> {
        let mpa = self
            .conn
            .query_row(
                "SELECT id, name, description FROM mpa WHERE id = ?1;",
                [id],
                |row| {
                    Ok(Mpa {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(mpa)
    }

    fn list_genres(&self) -> RepoResult<Vec<Genre>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM genres ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(Genre {
                id: row.get(0)?,
                name: row.get(1)?,
            });
        }
        Ok(items)
    }

    fn find_genre(&self, id: GenreId) -> RepoResult<Option<Genre>> {
        let genre = self
            .conn
            .query_row("SELECT id, name FROM genres WHERE id = ?1;", [id], |row| {
                Ok(Genre {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .optional()?;
        Ok(genre)
    }
}
