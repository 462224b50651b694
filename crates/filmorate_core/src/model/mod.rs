//! Catalog domain model for films, users and their relations.
//!
//! # Responsibility
//! - Define canonical records shared by both storage backends.
//! - Keep relation sets (likes, genres, friends) on the returned snapshot.
//!
//! # Invariants
//! - `id == None` means "not yet persisted"; backends assign ids on create.
//! - Relation sets are ordered and free of duplicates.

pub mod film;
pub mod reference;
pub mod user;
pub mod validation;
