//! Core of the Filmorate catalog: films, users and their relations.
//!
//! The repository contract in [`repo`] is satisfied by an in-memory backend
//! and a SQLite backend with identical observable behavior; [`service`] is
//! the only caller of repository operations.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{CatalogConfig, ConfigError, StorageBackend};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::film::{Film, FilmId};
pub use model::reference::{Genre, GenreId, Mpa, MpaId};
pub use model::user::{FriendshipStatus, User, UserId};
pub use model::validation::ValidationError;
pub use repo::{
    EntityKind, FilmRepository, MemoryFilmRepository, MemoryReferenceCatalog,
    MemoryUserRepository, ReferenceRepository, RepoError, RepoResult, SqliteFilmRepository,
    SqliteReferenceRepository, SqliteUserRepository, UserRepository,
};
pub use service::film_service::FilmService;
pub use service::reference_service::ReferenceService;
pub use service::user_service::UserService;
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
