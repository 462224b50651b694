//! User domain model.
//!
//! # Responsibility
//! - Define the user record and its directed friend edges.
//! - Provide validation and the name-defaults-to-login normalization.
//!
//! # Invariants
//! - A friend edge `a -> b` says nothing about `b -> a`.
//! - New edges start as `FriendshipStatus::Pending`; confirmation is a
//!   separate operation.

use super::validation::ValidationError;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type UserId = i64;

/// Confirmation state carried by one directed friend edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipStatus {
    /// Edge exists but the other side has not confirmed it.
    Pending,
    /// Edge has been confirmed.
    Confirmed,
}

impl FriendshipStatus {
    pub fn is_confirmed(self) -> bool {
        matches!(self, Self::Confirmed)
    }

    pub fn from_confirmed(confirmed: bool) -> Self {
        if confirmed {
            Self::Confirmed
        } else {
            Self::Pending
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<UserId>,
    pub email: String,
    pub login: String,
    /// Display name. Blank input is replaced by `login` during validation.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    /// Outgoing friend edges keyed by target user id.
    #[serde(default)]
    pub friends: BTreeMap<UserId, FriendshipStatus>,
}

impl User {
    /// Creates an unsaved user; `name` starts blank.
    pub fn new(email: impl Into<String>, login: impl Into<String>) -> Self {
        Self {
            id: None,
            email: email.into(),
            login: login.into(),
            name: String::new(),
            birthday: None,
            friends: BTreeMap::new(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Validates against the current local date.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        self.validate_as_of(Local::now().date_naive())
    }

    /// Validates fields and fills a blank display name from `login`.
    ///
    /// # Invariants
    /// - `today` is the reference date for the not-in-the-future rule.
    /// - The name default is applied only when every check passes.
    pub fn validate_as_of(&mut self, today: NaiveDate) -> Result<(), ValidationError> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }

        if self.login.trim().is_empty() || self.login.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidLogin(self.login.clone()));
        }

        if let Some(birthday) = self.birthday {
            if birthday > today {
                return Err(ValidationError::BirthdayInFuture(birthday));
            }
        }

        if self.name.trim().is_empty() {
            self.name = self.login.clone();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{FriendshipStatus, User};
    use crate::model::validation::ValidationError;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn blank_name_defaults_to_login() {
        let mut user = User::new("maria@example.com", "tochmary");
        user.validate_as_of(today()).unwrap();
        assert_eq!(user.name, "tochmary");

        let mut named = User::new("maria@example.com", "tochmary");
        named.name = "Maria".to_string();
        named.validate_as_of(today()).unwrap();
        assert_eq!(named.name, "Maria");
    }

    #[test]
    fn validate_rejects_bad_email_and_login() {
        let mut no_at = User::new("maria.example.com", "tochmary");
        assert!(matches!(
            no_at.validate_as_of(today()),
            Err(ValidationError::InvalidEmail(_))
        ));

        let mut spaced = User::new("maria@example.com", "toch mary");
        assert!(matches!(
            spaced.validate_as_of(today()),
            Err(ValidationError::InvalidLogin(_))
        ));
        assert!(spaced.name.is_empty());
    }

    #[test]
    fn validate_rejects_future_birthday_only() {
        let mut user = User::new("maria@example.com", "tochmary");
        user.birthday = Some(today());
        user.validate_as_of(today()).unwrap();

        user.birthday = today().succ_opt();
        assert!(matches!(
            user.validate_as_of(today()),
            Err(ValidationError::BirthdayInFuture(_))
        ));
    }

    #[test]
    fn friendship_status_maps_confirmation_flag() {
        assert_eq!(FriendshipStatus::from_confirmed(false), FriendshipStatus::Pending);
        assert!(FriendshipStatus::from_confirmed(true).is_confirmed());
    }
}
