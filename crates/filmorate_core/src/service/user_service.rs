//! User use-case service.
//!
//! # Invariants
//! - Users are validated (and their display name defaulted) before writes.
//! - Friend operations require both users to exist.

use super::{ServiceError, ServiceResult};
use crate::model::user::{FriendshipStatus, User, UserId};
use crate::repo::{EntityKind, RepoError, UserRepository};
use log::info;

/// User service facade over one user backend.
pub struct UserService<U: UserRepository> {
    users: U,
}

impl<U: UserRepository> UserService<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    pub fn find_all(&self) -> ServiceResult<Vec<User>> {
        Ok(self.users.find_all()?)
    }

    /// Gets one user, failing with `NotFound` when absent.
    pub fn find_by_id(&self, id: UserId) -> ServiceResult<User> {
        self.users
            .find_by_id(id)?
            .ok_or(ServiceError::not_found(EntityKind::User, id))
    }

    /// Validates a copy of `user` (filling a blank name) and stores it.
    pub fn create(&self, user: &User) -> ServiceResult<User> {
        let mut user = user.clone();
        user.validate()?;
        let created = self.users.create(&user)?;
        info!(
            "event=user_create module=service status=ok user_id={}",
            created.id.unwrap_or_default()
        );
        Ok(created)
    }

    /// Replaces an existing user; absent ids fail before any write.
    pub fn update(&self, user: &User) -> ServiceResult<User> {
        let mut user = user.clone();
        user.validate()?;
        let id = user.id.ok_or(RepoError::MissingId(EntityKind::User))?;
        self.ensure_user(id)?;
        let updated = self.users.update(&user)?;
        info!("event=user_update module=service status=ok user_id={id}");
        Ok(updated)
    }

    pub fn add_friend(&self, user_id: UserId, friend_id: UserId) -> ServiceResult<User> {
        self.ensure_pair(user_id, friend_id)?;
        Ok(self.users.add_friend(user_id, friend_id)?)
    }

    pub fn confirm_friend(&self, user_id: UserId, friend_id: UserId) -> ServiceResult<User> {
        self.ensure_pair(user_id, friend_id)?;
        Ok(self.users.confirm_friend(user_id, friend_id)?)
    }

    pub fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> ServiceResult<User> {
        self.ensure_pair(user_id, friend_id)?;
        Ok(self.users.remove_friend(user_id, friend_id)?)
    }

    /// State of edge `user_id -> friend_id`, `None` when there is no edge.
    pub fn friend_status(
        &self,
        user_id: UserId,
        friend_id: UserId,
    ) -> ServiceResult<Option<FriendshipStatus>> {
        let user = self.find_by_id(user_id)?;
        Ok(user.friends.get(&friend_id).copied())
    }

    /// Users on the outgoing side of `user_id`'s edges, ordered by id.
    pub fn list_friends(&self, user_id: UserId) -> ServiceResult<Vec<User>> {
        let user = self.find_by_id(user_id)?;
        let mut friends = Vec::with_capacity(user.friends.len());
        for friend_id in user.friends.keys() {
            if let Some(friend) = self.users.find_by_id(*friend_id)? {
                friends.push(friend);
            }
        }
        Ok(friends)
    }

    fn ensure_user(&self, id: UserId) -> ServiceResult<()> {
        if self.users.exists(id)? {
            Ok(())
        } else {
            Err(ServiceError::not_found(EntityKind::User, id))
        }
    }

    fn ensure_pair(&self, user_id: UserId, friend_id: UserId) -> ServiceResult<()> {
        self.ensure_user(user_id)?;
        self.ensure_user(friend_id)
    }
}
