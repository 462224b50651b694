//! In-memory catalog backend.
//!
//! # Responsibility
//! - Satisfy the film/user/reference contracts without a database.
//! - Behave exactly like the SQLite backend for every operation sequence,
//!   except that nothing survives the process.
//!
//! # Invariants
//! - Stored records are never handed out; callers always get clones.
//! - Ids come from a per-instance counter starting at 1 and are never reused.
//! - Clones of a repository share the same underlying state.
//! - Likes and friend edges may only point at users stored in the same
//!   `MemoryUserRepository`; unknown users are a `RepoError::Constraint`,
//!   as the SQLite foreign keys report them.

use super::film_repo::FilmRepository;
use super::reference_repo::ReferenceRepository;
use super::user_repo::UserRepository;
use super::{EntityKind, RepoError, RepoResult};
use crate::model::film::{Film, FilmId};
use crate::model::reference::{default_genres, default_mpa, Genre, GenreId, Mpa, MpaId};
use crate::model::user::{FriendshipStatus, User, UserId};
use dashmap::DashMap;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Seeded MPA/genre catalog shared by in-memory repositories.
#[derive(Debug, Clone)]
pub struct MemoryReferenceCatalog {
    mpa: Arc<Vec<Mpa>>,
    genres: Arc<Vec<Genre>>,
}

impl MemoryReferenceCatalog {
    /// Builds a catalog with the same seed the SQLite schema ships.
    pub fn seeded() -> Self {
        Self {
            mpa: Arc::new(default_mpa()),
            genres: Arc::new(default_genres()),
        }
    }

    fn resolve_mpa(&self, mpa: Option<&Mpa>) -> RepoResult<Option<Mpa>> {
        let Some(mpa) = mpa else {
            return Ok(None);
        };
        self.mpa
            .iter()
            .find(|known| known.id == mpa.id)
            .cloned()
            .map(Some)
            .ok_or_else(|| unknown_reference(EntityKind::Mpa, mpa.id))
    }

    fn resolve_genres(&self, genre_ids: &[GenreId]) -> RepoResult<Vec<Genre>> {
        genre_ids
            .iter()
            .map(|id| {
                self.genres
                    .iter()
                    .find(|known| known.id == *id)
                    .cloned()
                    .ok_or_else(|| unknown_reference(EntityKind::Genre, *id))
            })
            .collect()
    }
}

impl Default for MemoryReferenceCatalog {
    fn default() -> Self {
        Self::seeded()
    }
}

impl ReferenceRepository for MemoryReferenceCatalog {
    fn list_mpa(&self) -> RepoResult<Vec<Mpa>> {
        Ok(self.mpa.to_vec())
    }

    fn find_mpa(&self, id: MpaId) -> RepoResult<Option<Mpa>> {
        Ok(self.mpa.iter().find(|mpa| mpa.id == id).cloned())
    }

    fn list_genres(&self) -> RepoResult<Vec<Genre>> {
        Ok(self.genres.to_vec())
    }

    fn find_genre(&self, id: GenreId) -> RepoResult<Option<Genre>> {
        Ok(self.genres.iter().find(|genre| genre.id == id).cloned())
    }
}

fn unknown_reference(kind: EntityKind, id: i64) -> RepoError {
    RepoError::Constraint(format!("unknown {kind} id {id}"))
}

/// Process-local film repository.
#[derive(Debug, Clone)]
pub struct MemoryFilmRepository {
    films: Arc<DashMap<FilmId, Film>>,
    next_id: Arc<AtomicI64>,
    catalog: MemoryReferenceCatalog,
    users: MemoryUserRepository,
}

impl MemoryFilmRepository {
    /// Creates an empty film store whose likes are checked against `users`.
    pub fn new(catalog: MemoryReferenceCatalog, users: MemoryUserRepository) -> Self {
        Self {
            films: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
            catalog,
            users,
        }
    }

    fn mutate_likes(
        &self,
        film_id: FilmId,
        mutate: impl FnOnce(&mut BTreeSet<UserId>),
    ) -> RepoResult<Film> {
        let mut film = self
            .films
            .get_mut(&film_id)
            .ok_or(RepoError::not_found(EntityKind::Film, film_id))?;
        mutate(&mut film.likes);
        Ok(film.clone())
    }
}

impl FilmRepository for MemoryFilmRepository {
    fn find_all(&self) -> RepoResult<Vec<Film>> {
        let mut films: Vec<Film> = self.films.iter().map(|entry| entry.value().clone()).collect();
        films.sort_by_key(|film| film.id);
        debug!("event=film_list module=repo backend=memory status=ok count={}", films.len());
        Ok(films)
    }

    fn find_by_id(&self, id: FilmId) -> RepoResult<Option<Film>> {
        Ok(self.films.get(&id).map(|film| film.clone()))
    }

    fn create(&self, film: &Film) -> RepoResult<Film> {
        let mpa = self.catalog.resolve_mpa(film.mpa.as_ref())?;
        let genres = self
            .catalog
            .resolve_genres(&film.genre_ids().unwrap_or_default())?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let stored = Film {
            id: Some(id),
            mpa,
            genres: Some(genres),
            likes: BTreeSet::new(),
            ..film.clone()
        };
        self.films.insert(id, stored.clone());

        debug!("event=film_create module=repo backend=memory status=ok film_id={id}");
        Ok(stored)
    }

    fn update(&self, film: &Film) -> RepoResult<Film> {
        let id = film.id.ok_or(RepoError::MissingId(EntityKind::Film))?;
        let mpa = self.catalog.resolve_mpa(film.mpa.as_ref())?;
        let genres = match film.genre_ids() {
            Some(ids) => Some(self.catalog.resolve_genres(&ids)?),
            None => None,
        };

        let mut stored = self
            .films
            .get_mut(&id)
            .ok_or(RepoError::not_found(EntityKind::Film, id))?;
        stored.name = film.name.clone();
        stored.description = film.description.clone();
        stored.release_date = film.release_date;
        stored.duration = film.duration;
        stored.mpa = mpa;
        if let Some(genres) = genres {
            stored.genres = Some(genres);
        }

        debug!("event=film_update module=repo backend=memory status=ok film_id={id}");
        Ok(stored.clone())
    }

    fn exists(&self, id: FilmId) -> RepoResult<bool> {
        Ok(self.films.contains_key(&id))
    }

    fn add_like(&self, film_id: FilmId, user_id: UserId) -> RepoResult<Film> {
        if !self.films.contains_key(&film_id) {
            return Err(RepoError::not_found(EntityKind::Film, film_id));
        }
        self.users.ensure_known(user_id)?;
        let film = self.mutate_likes(film_id, |likes| {
            likes.insert(user_id);
        })?;
        debug!("event=like_add module=repo backend=memory status=ok film_id={film_id} user_id={user_id}");
        Ok(film)
    }

    fn remove_like(&self, film_id: FilmId, user_id: UserId) -> RepoResult<Film> {
        let film = self.mutate_likes(film_id, |likes| {
            likes.remove(&user_id);
        })?;
        debug!("event=like_remove module=repo backend=memory status=ok film_id={film_id} user_id={user_id}");
        Ok(film)
    }
}

/// Process-local user repository.
#[derive(Debug, Clone)]
pub struct MemoryUserRepository {
    users: Arc<DashMap<UserId, User>>,
    next_id: Arc<AtomicI64>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Rejects relation targets that are not stored here.
    fn ensure_known(&self, id: UserId) -> RepoResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(unknown_reference(EntityKind::User, id))
        }
    }

    fn mutate_edges(
        &self,
        user_id: UserId,
        mutate: impl FnOnce(&mut BTreeMap<UserId, FriendshipStatus>),
    ) -> RepoResult<User> {
        let mut user = self
            .users
            .get_mut(&user_id)
            .ok_or(RepoError::not_found(EntityKind::User, user_id))?;
        mutate(&mut user.friends);
        Ok(user.clone())
    }
}

impl Default for MemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRepository for MemoryUserRepository {
    fn find_all(&self) -> RepoResult<Vec<User>> {
        let mut users: Vec<User> = self.users.iter().map(|entry| entry.value().clone()).collect();
        users.sort_by_key(|user| user.id);
        debug!("event=user_list module=repo backend=memory status=ok count={}", users.len());
        Ok(users)
    }

    fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self.users.get(&id).map(|user| user.clone()))
    }

    fn create(&self, user: &User) -> RepoResult<User> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let stored = User {
            id: Some(id),
            friends: BTreeMap::new(),
            ..user.clone()
        };
        self.users.insert(id, stored.clone());

        debug!("event=user_create module=repo backend=memory status=ok user_id={id}");
        Ok(stored)
    }

    fn update(&self, user: &User) -> RepoResult<User> {
        let id = user.id.ok_or(RepoError::MissingId(EntityKind::User))?;
        let mut stored = self
            .users
            .get_mut(&id)
            .ok_or(RepoError::not_found(EntityKind::User, id))?;
        stored.email = user.email.clone();
        stored.login = user.login.clone();
        stored.name = user.name.clone();
        stored.birthday = user.birthday;

        debug!("event=user_update module=repo backend=memory status=ok user_id={id}");
        Ok(stored.clone())
    }

    fn exists(&self, id: UserId) -> RepoResult<bool> {
        Ok(self.users.contains_key(&id))
    }

    fn add_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<User> {
        if !self.users.contains_key(&user_id) {
            return Err(RepoError::not_found(EntityKind::User, user_id));
        }
        self.ensure_known(friend_id)?;
        let user = self.mutate_edges(user_id, |edges| {
            edges.entry(friend_id).or_insert(FriendshipStatus::Pending);
        })?;
        debug!("event=friend_add module=repo backend=memory status=ok user_id={user_id} friend_id={friend_id}");
        Ok(user)
    }

    fn confirm_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<User> {
        let user = self.mutate_edges(user_id, |edges| {
            if let Some(status) = edges.get_mut(&friend_id) {
                *status = FriendshipStatus::Confirmed;
            }
        })?;
        debug!("event=friend_confirm module=repo backend=memory status=ok user_id={user_id} friend_id={friend_id}");
        Ok(user)
    }

    fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<User> {
        let user = self.mutate_edges(user_id, |edges| {
            edges.remove(&friend_id);
        })?;
        debug!("event=friend_remove module=repo backend=memory status=ok user_id={user_id} friend_id={friend_id}");
        Ok(user)
    }
}
