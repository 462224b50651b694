//! Film repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Define the film data access contract shared by both backends.
//! - Keep film/genre/like SQL inside the persistence boundary.
//!
//! # Invariants
//! - Likes and genres are derived from join tables on every read.
//! - `update` replaces genre links only when the input carries genres:
//!   absent leaves them untouched, empty clears them.
//! - Multi-statement writes run inside one immediate transaction.

use super::schema::{ensure_connection_ready, row_exists, FILM_TABLES};
use super::{EntityKind, RepoError, RepoResult};
use crate::model::film::{Film, FilmId};
use crate::model::reference::{Genre, GenreId, Mpa};
use crate::model::user::UserId;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::{BTreeMap, BTreeSet};

const FILM_SELECT_SQL: &str = "SELECT
    f.id,
    f.name,
    f.description,
    f.release_date,
    f.duration,
    f.mpa_id,
    m.name AS mpa_name,
    m.description AS mpa_description
FROM films f
LEFT JOIN mpa m ON m.id = f.mpa_id";

/// Repository interface for films and their likes/genres.
pub trait FilmRepository {
    /// Lists every film ordered by ascending id.
    fn find_all(&self) -> RepoResult<Vec<Film>>;
    /// Gets one film; absence is `Ok(None)`.
    fn find_by_id(&self, id: FilmId) -> RepoResult<Option<Film>>;
    /// Persists a new film and returns it with the assigned id.
    fn create(&self, film: &Film) -> RepoResult<Film>;
    /// Replaces scalar fields and MPA; genres follow the absent/empty rule.
    fn update(&self, film: &Film) -> RepoResult<Film>;
    fn exists(&self, id: FilmId) -> RepoResult<bool>;
    /// Adds one like; repeating it is a no-op.
    fn add_like(&self, film_id: FilmId, user_id: UserId) -> RepoResult<Film>;
    /// Removes one like; removing an absent like is a no-op.
    fn remove_like(&self, film_id: FilmId, user_id: UserId) -> RepoResult<Film>;
}

/// SQLite-backed film repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteFilmRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFilmRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, FILM_TABLES)?;
        Ok(Self { conn })
    }

    fn begin(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl FilmRepository for SqliteFilmRepository<'_> {
    fn find_all(&self) -> RepoResult<Vec<Film>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FILM_SELECT_SQL} ORDER BY f.id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut films = Vec::new();
        while let Some(row) = rows.next()? {
            films.push(parse_film_row(row)?);
        }

        // Two batched queries instead of one pair per film.
        let mut genres = load_all_genre_links(self.conn)?;
        let mut likes = load_all_likes(self.conn)?;
        for film in &mut films {
            let id = film.id.unwrap_or_default();
            film.genres = Some(genres.remove(&id).unwrap_or_default());
            film.likes = likes.remove(&id).unwrap_or_default();
        }

        Ok(films)
    }

    fn find_by_id(&self, id: FilmId) -> RepoResult<Option<Film>> {
        load_film(self.conn, id)
    }

    fn create(&self, film: &Film) -> RepoResult<Film> {
        let tx = self.begin()?;
        tx.execute(
            "INSERT INTO films (name, description, release_date, duration, mpa_id)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                film.name.as_str(),
                film.description.as_deref(),
                film.release_date,
                film.duration,
                film.mpa.as_ref().map(|mpa| mpa.id),
            ],
        )?;
        let id = tx.last_insert_rowid();

        if let Some(genre_ids) = film.genre_ids() {
            insert_genre_links(&tx, id, &genre_ids)?;
        }

        let created = load_film(&tx, id)?.ok_or(RepoError::not_found(EntityKind::Film, id))?;
        tx.commit()?;

        debug!("event=film_create module=repo backend=sqlite status=ok film_id={id}");
        Ok(created)
    }

    fn update(&self, film: &Film) -> RepoResult<Film> {
        let id = film.id.ok_or(RepoError::MissingId(EntityKind::Film))?;
        let tx = self.begin()?;

        let changed = tx.execute(
            "UPDATE films
             SET
                name = ?1,
                description = ?2,
                release_date = ?3,
                duration = ?4,
                mpa_id = ?5
             WHERE id = ?6;",
            params![
                film.name.as_str(),
                film.description.as_deref(),
                film.release_date,
                film.duration,
                film.mpa.as_ref().map(|mpa| mpa.id),
                id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Film, id));
        }

        if let Some(genre_ids) = film.genre_ids() {
            tx.execute("DELETE FROM film_genres WHERE film_id = ?1;", [id])?;
            insert_genre_links(&tx, id, &genre_ids)?;
        }

        let updated = load_film(&tx, id)?.ok_or(RepoError::not_found(EntityKind::Film, id))?;
        tx.commit()?;

        debug!("event=film_update module=repo backend=sqlite status=ok film_id={id}");
        Ok(updated)
    }

    fn exists(&self, id: FilmId) -> RepoResult<bool> {
        row_exists(self.conn, "films", id)
    }

    fn add_like(&self, film_id: FilmId, user_id: UserId) -> RepoResult<Film> {
        let tx = self.begin()?;
        if !row_exists(&tx, "films", film_id)? {
            return Err(RepoError::not_found(EntityKind::Film, film_id));
        }

        tx.execute(
            "INSERT OR IGNORE INTO likes (film_id, user_id) VALUES (?1, ?2);",
            [film_id, user_id],
        )?;
        let film =
            load_film(&tx, film_id)?.ok_or(RepoError::not_found(EntityKind::Film, film_id))?;
        tx.commit()?;

        debug!("event=like_add module=repo backend=sqlite status=ok film_id={film_id} user_id={user_id}");
        Ok(film)
    }

    fn remove_like(&self, film_id: FilmId, user_id: UserId) -> RepoResult<Film> {
        let tx = self.begin()?;
        if !row_exists(&tx, "films", film_id)? {
            return Err(RepoError::not_found(EntityKind::Film, film_id));
        }

        tx.execute(
            "DELETE FROM likes WHERE film_id = ?1 AND user_id = ?2;",
            [film_id, user_id],
        )?;
        let film =
            load_film(&tx, film_id)?.ok_or(RepoError::not_found(EntityKind::Film, film_id))?;
        tx.commit()?;

        debug!("event=like_remove module=repo backend=sqlite status=ok film_id={film_id} user_id={user_id}");
        Ok(film)
    }
}

fn load_film(conn: &Connection, id: FilmId) -> RepoResult<Option<Film>> {
    let film = conn
        .query_row(
            &format!("{FILM_SELECT_SQL} WHERE f.id = ?1;"),
            [id],
            |row| Ok(parse_film_row(row)),
        )
        .optional()?
        .transpose()?;

    let Some(mut film) = film else {
        return Ok(None);
    };
    film.genres = Some(load_genre_links(conn, id)?);
    film.likes = load_likes(conn, id)?;
    Ok(Some(film))
}

fn parse_film_row(row: &Row<'_>) -> RepoResult<Film> {
    let id: FilmId = row.get("id")?;
    let duration = match row.get::<_, Option<i64>>("duration")? {
        Some(value) => Some(u32::try_from(value).map_err(|_| {
            RepoError::InvalidData(format!("invalid duration `{value}` in films.duration"))
        })?),
        None => None,
    };

    let mpa = match row.get::<_, Option<i64>>("mpa_id")? {
        Some(mpa_id) => Some(Mpa {
            id: mpa_id,
            name: row.get::<_, Option<String>>("mpa_name")?.ok_or_else(|| {
                RepoError::InvalidData(format!("dangling mpa_id `{mpa_id}` for film {id}"))
            })?,
            description: row
                .get::<_, Option<String>>("mpa_description")?
                .unwrap_or_default(),
        }),
        None => None,
    };

    Ok(Film {
        id: Some(id),
        name: row.get("name")?,
        description: row.get("description")?,
        release_date: row.get("release_date")?,
        duration,
        mpa,
        genres: None,
        likes: BTreeSet::new(),
    })
}

fn insert_genre_links(tx: &Transaction<'_>, film_id: FilmId, genre_ids: &[GenreId]) -> RepoResult<()> {
    let mut stmt = tx.prepare("INSERT INTO film_genres (film_id, genre_id) VALUES (?1, ?2);")?;
    for genre_id in genre_ids {
        stmt.execute([film_id, *genre_id])?;
    }
    Ok(())
}

fn load_genre_links(conn: &Connection, film_id: FilmId) -> RepoResult<Vec<Genre>> {
    let mut stmt = conn.prepare(
        "SELECT g.id, g.name
         FROM film_genres fg
         INNER JOIN genres g ON g.id = fg.genre_id
         WHERE fg.film_id = ?1
         ORDER BY g.id ASC;",
    )?;
    let mut rows = stmt.query([film_id])?;
    let mut genres = Vec::new();
    while let Some(row) = rows.next()? {
        genres.push(Genre {
            id: row.get(0)?,
            name: row.get(1)?,
        });
    }
    Ok(genres)
}

fn load_likes(conn: &Connection, film_id: FilmId) -> RepoResult<BTreeSet<UserId>> {
    let mut stmt = conn.prepare("SELECT user_id FROM likes WHERE film_id = ?1;")?;
    let mut rows = stmt.query([film_id])?;
    let mut likes = BTreeSet::new();
    while let Some(row) = rows.next()? {
        likes.insert(row.get(0)?);
    }
    Ok(likes)
}

fn load_all_genre_links(conn: &Connection) -> RepoResult<BTreeMap<FilmId, Vec<Genre>>> {
    let mut stmt = conn.prepare(
        "SELECT fg.film_id, g.id, g.name
         FROM film_genres fg
         INNER JOIN genres g ON g.id = fg.genre_id
         ORDER BY fg.film_id ASC, g.id ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut links: BTreeMap<FilmId, Vec<Genre>> = BTreeMap::new();
    while let Some(row) = rows.next()? {
        links.entry(row.get(0)?).or_default().push(Genre {
            id: row.get(1)?,
            name: row.get(2)?,
        });
    }
    Ok(links)
}

fn load_all_likes(conn: &Connection) -> RepoResult<BTreeMap<FilmId, BTreeSet<UserId>>> {
    let mut stmt = conn.prepare("SELECT film_id, user_id FROM likes;")?;
    let mut rows = stmt.query([])?;
    let mut likes: BTreeMap<FilmId, BTreeSet<UserId>> = BTreeMap::new();
    while let Some(row) = rows.next()? {
        likes.entry(row.get(0)?).or_default().insert(row.get(1)?);
    }
    Ok(likes)
}
