//! Film domain model.
//!
//! # Responsibility
//! - Define the film record and its relation-holding fields.
//! - Provide field-level validation used by the service layer.
//!
//! # Invariants
//! - `id` is assigned by the backend on create and never changes.
//! - `genres == None` is "absent", `Some(vec![])` is "empty"; the update path
//!   treats the two differently.
//! - `likes` holds user ids only; a repeated like is a no-op.

use super::reference::{Genre, GenreId, Mpa};
use super::user::UserId;
use super::validation::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type FilmId = i64;

/// Longest accepted description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// Earliest accepted release date (first public film screening).
pub fn earliest_release_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1895, 12, 28).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    #[serde(default)]
    pub id: Option<FilmId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    /// Runtime in minutes.
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub mpa: Option<Mpa>,
    #[serde(default)]
    pub genres: Option<Vec<Genre>>,
    #[serde(default)]
    pub likes: BTreeSet<UserId>,
}

impl Film {
    /// Creates an unsaved film with only a name set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            release_date: None,
            duration: None,
            mpa: None,
            genres: None,
            likes: BTreeSet::new(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Unique genre ids in ascending order, or `None` when genres are absent.
    pub fn genre_ids(&self) -> Option<Vec<GenreId>> {
        self.genres.as_ref().map(|genres| {
            genres
                .iter()
                .map(|genre| genre.id)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        })
    }

    /// Checks field-level rules before the film reaches storage.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankFilmName);
        }

        if let Some(description) = self.description.as_deref() {
            let length = description.chars().count();
            if length > MAX_DESCRIPTION_CHARS {
                return Err(ValidationError::DescriptionTooLong {
                    length,
                    max: MAX_DESCRIPTION_CHARS,
                });
            }
        }

        if let Some(release_date) = self.release_date {
            if release_date < earliest_release_date() {
                return Err(ValidationError::ReleaseDateTooEarly(release_date));
            }
        }

        if self.duration == Some(0) {
            return Err(ValidationError::NonPositiveDuration);
        }

        Ok(())
    }
}
