//! Fixed reference data: MPA ratings and genres.
//!
//! Both kinds are seeded once per storage backend and never mutated by core.

use serde::{Deserialize, Serialize};

pub type MpaId = i64;
pub type GenreId = i64;

/// Content-rating classification shared by many films.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mpa {
    pub id: MpaId,
    /// Label such as `PG-13`. Empty on inbound references carrying only the id.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Mpa {
    /// Builds an id-only reference, as sent by clients.
    pub fn from_id(id: MpaId) -> Self {
        Self {
            id,
            name: String::new(),
            description: String::new(),
        }
    }

    pub fn new(id: MpaId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Category label attachable to many films.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    #[serde(default)]
    pub name: String,
}

impl Genre {
    /// Builds an id-only reference, as sent by clients.
    pub fn from_id(id: GenreId) -> Self {
        Self {
            id,
            name: String::new(),
        }
    }

    pub fn new(id: GenreId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Seeded MPA ratings, identical for every backend.
pub fn default_mpa() -> Vec<Mpa> {
    vec![
        Mpa::new(1, "G", "No age restrictions"),
        Mpa::new(2, "PG", "Parental guidance suggested"),
        Mpa::new(3, "PG-13", "Not recommended under 13"),
        Mpa::new(4, "R", "Under 17 requires accompanying adult"),
        Mpa::new(5, "NC-17", "No one 17 and under admitted"),
    ]
}

/// Seeded genres, identical for every backend.
pub fn default_genres() -> Vec<Genre> {
    vec![
        Genre::new(1, "Comedy"),
        Genre::new(2, "Drama"),
        Genre::new(3, "Animation"),
        Genre::new(4, "Thriller"),
        Genre::new(5, "Documentary"),
        Genre::new(6, "Action"),
    ]
}
