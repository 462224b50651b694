//! MPA/genre lookup service.

use super::{ServiceError, ServiceResult};
use crate::model::reference::{Genre, GenreId, Mpa, MpaId};
use crate::repo::{EntityKind, ReferenceRepository};

pub struct ReferenceService<R: ReferenceRepository> {
    repo: R,
}

impl<R: ReferenceRepository> ReferenceService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_mpa(&self) -> ServiceResult<Vec<Mpa>> {
        Ok(self.repo.list_mpa()?)
    }

    pub fn find_mpa(&self, id: MpaId) -> ServiceResult<Mpa> {
        self.repo
            .find_mpa(id)?
            .ok_or(ServiceError::not_found(EntityKind::Mpa, id))
    }

    pub fn list_genres(&self) -> ServiceResult<Vec<Genre>> {
        Ok(self.repo.list_genres()?)
    }

    pub fn find_genre(&self, id: GenreId) -> ServiceResult<Genre> {
        self.repo
            .find_genre(id)?
            .ok_or(ServiceError::not_found(EntityKind::Genre, id))
    }
}
