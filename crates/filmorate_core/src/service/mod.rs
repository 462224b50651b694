//! Catalog use-case services.
//!
//! # Responsibility
//! - Validate input, then delegate to exactly one repository backend.
//! - Translate missing ids into `ServiceError::NotFound`.
//!
//! # Invariants
//! - `update` checks existence before writing.
//! - Relation operations check both endpoints before mutating, for films and
//!   users alike.

use crate::model::validation::ValidationError;
use crate::repo::{EntityKind, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod film_service;
pub mod reference_service;
pub mod user_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error surfaced to the routing layer.
#[derive(Debug)]
pub enum ServiceError {
    /// Input violates a field-level rule.
    Validation(ValidationError),
    /// Referenced entity does not exist.
    NotFound { kind: EntityKind, id: i64 },
    /// Backend failure, including constraint rejections.
    Repo(RepoError),
}

impl ServiceError {
    pub fn not_found(kind: EntityKind, id: i64) -> Self {
        Self::NotFound { kind, id }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} with id {id} does not exist"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            other => Self::Repo(other),
        }
    }
}
