//! Process-start configuration: storage backend selection and logging.
//!
//! # Invariants
//! - The backend is chosen once at startup; nothing switches it at runtime.
//! - `sqlite` requires a non-blank database path.

use crate::logging::{default_log_level, is_supported_level, normalize_log_dir};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_STORAGE: &str = "FILMORATE_STORAGE";
pub const ENV_DB_PATH: &str = "FILMORATE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "FILMORATE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "FILMORATE_LOG_DIR";

/// Which repository backend serves the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageBackend {
    /// Process-local maps; state is lost on exit.
    Memory,
    /// SQLite database file at `path`.
    Sqlite { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub backend: StorageBackend,
    pub log_level: String,
    /// File logging is enabled only when set.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownBackend(String),
    MissingDatabasePath,
    InvalidLogLevel(String),
    InvalidLogDir(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownBackend(value) => write!(
                f,
                "unknown storage backend `{value}`; expected memory|sqlite"
            ),
            Self::MissingDatabasePath => {
                write!(f, "{ENV_DB_PATH} must be set when {ENV_STORAGE}=sqlite")
            }
            Self::InvalidLogLevel(value) => write!(f, "unsupported log level `{value}`"),
            Self::InvalidLogDir(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {}

impl CatalogConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let backend = match read(ENV_STORAGE).map(|value| value.to_ascii_lowercase()) {
            None => StorageBackend::Memory,
            Some(value) if value == "memory" => StorageBackend::Memory,
            Some(value) if value == "sqlite" => StorageBackend::Sqlite {
                path: read(ENV_DB_PATH)
                    .map(PathBuf::from)
                    .ok_or(ConfigError::MissingDatabasePath)?,
            },
            Some(other) => return Err(ConfigError::UnknownBackend(other)),
        };

        let log_level = read(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string());
        if !is_supported_level(&log_level) {
            return Err(ConfigError::InvalidLogLevel(log_level));
        }

        let log_dir = match read(ENV_LOG_DIR) {
            Some(value) => Some(normalize_log_dir(&value).map_err(ConfigError::InvalidLogDir)?),
            None => None,
        };

        Ok(Self {
            backend,
            log_level,
            log_dir,
        })
    }
}
