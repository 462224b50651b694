//! Film use-case service.
//!
//! # Invariants
//! - Films are validated before `create`/`update`.
//! - Likes require both the film and the user to exist.

use super::{ServiceError, ServiceResult};
use crate::model::film::{Film, FilmId};
use crate::model::user::UserId;
use crate::repo::{EntityKind, FilmRepository, RepoError, UserRepository};
use log::info;

/// Number of films returned by `popular` when no count is given.
pub const DEFAULT_POPULAR_COUNT: usize = 10;

/// Film service facade over one film backend and its user counterpart.
pub struct FilmService<F: FilmRepository, U: UserRepository> {
    films: F,
    users: U,
}

impl<F: FilmRepository, U: UserRepository> FilmService<F, U> {
    /// Creates a service; `users` is consulted only for like guards.
    pub fn new(films: F, users: U) -> Self {
        Self { films, users }
    }

    pub fn find_all(&self) -> ServiceResult<Vec<Film>> {
        Ok(self.films.find_all()?)
    }

    /// Gets one film, failing with `NotFound` when absent.
    pub fn find_by_id(&self, id: FilmId) -> ServiceResult<Film> {
        self.films
            .find_by_id(id)?
            .ok_or(ServiceError::not_found(EntityKind::Film, id))
    }

    pub fn create(&self, film: &Film) -> ServiceResult<Film> {
        film.validate()?;
        let created = self.films.create(film)?;
        info!(
            "event=film_create module=service status=ok film_id={}",
            created.id.unwrap_or_default()
        );
        Ok(created)
    }

    /// Replaces an existing film; absent ids fail before any write.
    pub fn update(&self, film: &Film) -> ServiceResult<Film> {
        film.validate()?;
        let id = film.id.ok_or(RepoError::MissingId(EntityKind::Film))?;
        self.ensure_film(id)?;
        let updated = self.films.update(film)?;
        info!("event=film_update module=service status=ok film_id={id}");
        Ok(updated)
    }

    pub fn add_like(&self, film_id: FilmId, user_id: UserId) -> ServiceResult<Film> {
        self.ensure_film(film_id)?;
        self.ensure_user(user_id)?;
        Ok(self.films.add_like(film_id, user_id)?)
    }

    pub fn remove_like(&self, film_id: FilmId, user_id: UserId) -> ServiceResult<Film> {
        self.ensure_film(film_id)?;
        self.ensure_user(user_id)?;
        Ok(self.films.remove_like(film_id, user_id)?)
    }

    /// Lists films by like count (descending), ties broken by ascending id.
    pub fn popular(&self, count: Option<usize>) -> ServiceResult<Vec<Film>> {
        let mut films = self.films.find_all()?;
        films.sort_by(|left, right| {
            right
                .likes
                .len()
                .cmp(&left.likes.len())
                .then(left.id.cmp(&right.id))
        });
        films.truncate(count.unwrap_or(DEFAULT_POPULAR_COUNT));
        Ok(films)
    }

    fn ensure_film(&self, id: FilmId) -> ServiceResult<()> {
        if self.films.exists(id)? {
            Ok(())
        } else {
            Err(ServiceError::not_found(EntityKind::Film, id))
        }
    }

    fn ensure_user(&self, id: UserId) -> ServiceResult<()> {
        if self.users.exists(id)? {
            Ok(())
        } else {
            Err(ServiceError::not_found(EntityKind::User, id))
        }
    }
}
