//! Field-level validation errors for films and users.

use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input rejected before it reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    BlankFilmName,
    DescriptionTooLong { length: usize, max: usize },
    ReleaseDateTooEarly(NaiveDate),
    NonPositiveDuration,
    InvalidEmail(String),
    InvalidLogin(String),
    BirthdayInFuture(NaiveDate),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankFilmName => write!(f, "film name must not be blank"),
            Self::DescriptionTooLong { length, max } => write!(
                f,
                "film description is {length} characters; at most {max} allowed"
            ),
            Self::ReleaseDateTooEarly(date) => {
                write!(f, "release date {date} is before 1895-12-28")
            }
            Self::NonPositiveDuration => write!(f, "film duration must be positive"),
            Self::InvalidEmail(value) => {
                write!(f, "email `{value}` must not be blank and must contain `@`")
            }
            Self::InvalidLogin(value) => {
                write!(f, "login `{value}` must not be blank or contain whitespace")
            }
            Self::BirthdayInFuture(date) => write!(f, "birthday {date} is in the future"),
        }
    }
}

impl Error for ValidationError {}
