//! Repository contract and its two storage backends.
//!
//! # Responsibility
//! - Define the film/user/reference data access contract.
//! - Provide an in-memory backend (`memory`) and a SQLite backend
//!   (`film_repo`, `user_repo`, `reference_repo`) with identical observable
//!   behavior.
//!
//! # Invariants
//! - Every call returns a freshly built snapshot with relations attached.
//! - Relation mutators are idempotent and fail with `NotFound` when the
//!   owning entity is missing.
//! - Unknown MPA/genre ids surface as `RepoError::Constraint`.

use crate::db::DbError;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod film_repo;
pub mod memory;
pub mod reference_repo;
mod schema;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Entity kind named in not-found and constraint reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Film,
    User,
    Mpa,
    Genre,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Film => "film",
            Self::User => "user",
            Self::Mpa => "mpa",
            Self::Genre => "genre",
        };
        f.write_str(label)
    }
}

/// Repository error shared by both backends.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target entity does not exist.
    NotFound { kind: EntityKind, id: i64 },
    /// `update` was called on an entity without an id.
    MissingId(EntityKind),
    /// Backend rejected a reference (unknown MPA/genre/user id, bad value).
    Constraint(String),
    /// Connection schema is not at the expected version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl RepoError {
    pub fn not_found(kind: EntityKind, id: i64) -> Self {
        Self::NotFound { kind, id }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::MissingId(kind) => write!(f, "{kind} update requires an id"),
            Self::Constraint(message) => write!(f, "constraint violation: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "catalog repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "catalog repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "catalog repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted catalog data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
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
        match value {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Self::Constraint(message.unwrap_or_else(|| failure.to_string()))
            }
            other => Self::Db(DbError::Sqlite(other)),
        }
    }
}

pub use film_repo::{FilmRepository, SqliteFilmRepository};
pub use memory::{MemoryFilmRepository, MemoryReferenceCatalog, MemoryUserRepository};
pub use reference_repo::{ReferenceRepository, SqliteReferenceRepository};
pub use user_repo::{SqliteUserRepository, UserRepository};
