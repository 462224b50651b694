//! User repository contract and SQLite implementation.
//!
//! # Invariants
//! - Friend edges are directed; `friends(user_id, friend_id)` never implies
//!   the reverse row.
//! - New edges are stored with `is_confirmed = 0`.
//! - Confirming or removing a missing edge is a no-op.

use super::schema::{ensure_connection_ready, row_exists, USER_TABLES};
use super::{EntityKind, RepoError, RepoResult};
use crate::model::user::{FriendshipStatus, User, UserId};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::BTreeMap;

const USER_SELECT_SQL: &str = "SELECT id, email, login, name, birthday FROM users";

/// Repository interface for users and their friend edges.
pub trait UserRepository {
    /// Lists every user ordered by ascending id.
    fn find_all(&self) -> RepoResult<Vec<User>>;
    fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>>;
    fn create(&self, user: &User) -> RepoResult<User>;
    /// Replaces scalar fields; friend edges are preserved.
    fn update(&self, user: &User) -> RepoResult<User>;
    fn exists(&self, id: UserId) -> RepoResult<bool>;
    /// Adds a pending edge `user_id -> friend_id`; an existing edge keeps its state.
    fn add_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<User>;
    /// Marks edge `user_id -> friend_id` confirmed when it exists.
    fn confirm_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<User>;
    fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<User>;
}

/// SQLite-backed user repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, USER_TABLES)?;
        Ok(Self { conn })
    }

    /// Runs one edge statement and reads the owner back in the same transaction.
    fn mutate_edge(&self, user_id: UserId, friend_id: UserId, sql: &str) -> RepoResult<User> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !row_exists(&tx, "users", user_id)? {
            return Err(RepoError::not_found(EntityKind::User, user_id));
        }

        tx.execute(sql, [user_id, friend_id])?;
        let user =
            load_user(&tx, user_id)?.ok_or(RepoError::not_found(EntityKind::User, user_id))?;
        tx.commit()?;
        Ok(user)
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn find_all(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }

        let mut edges = load_all_friend_edges(self.conn)?;
        for user in &mut users {
            user.friends = edges.remove(&user.id.unwrap_or_default()).unwrap_or_default();
        }
        Ok(users)
    }

    fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        load_user(self.conn, id)
    }

    fn create(&self, user: &User) -> RepoResult<User> {
        self.conn.execute(
            "INSERT INTO users (email, login, name, birthday) VALUES (?1, ?2, ?3, ?4);",
            params![
                user.email.as_str(),
                user.login.as_str(),
                user.name.as_str(),
                user.birthday,
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        debug!("event=user_create module=repo backend=sqlite status=ok user_id={id}");
        load_user(self.conn, id)?.ok_or(RepoError::not_found(EntityKind::User, id))
    }

    fn update(&self, user: &User) -> RepoResult<User> {
        let id = user.id.ok_or(RepoError::MissingId(EntityKind::User))?;
        let changed = self.conn.execute(
            "UPDATE users
             SET
                email = ?1,
                login = ?2,
                name = ?3,
                birthday = ?4
             WHERE id = ?5;",
            params![
                user.email.as_str(),
                user.login.as_str(),
                user.name.as_str(),
                user.birthday,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::User, id));
        }

        debug!("event=user_update module=repo backend=sqlite status=ok user_id={id}");
        load_user(self.conn, id)?.ok_or(RepoError::not_found(EntityKind::User, id))
    }

    fn exists(&self, id: UserId) -> RepoResult<bool> {
        row_exists(self.conn, "users", id)
    }

    fn add_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<User> {
        let user = self.mutate_edge(
            user_id,
            friend_id,
            "INSERT OR IGNORE INTO friends (user_id, friend_id, is_confirmed) VALUES (?1, ?2, 0);",
        )?;
        debug!("event=friend_add module=repo backend=sqlite status=ok user_id={user_id} friend_id={friend_id}");
        Ok(user)
    }

    fn confirm_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<User> {
        let user = self.mutate_edge(
            user_id,
            friend_id,
            "UPDATE friends SET is_confirmed = 1 WHERE user_id = ?1 AND friend_id = ?2;",
        )?;
        debug!("event=friend_confirm module=repo backend=sqlite status=ok user_id={user_id} friend_id={friend_id}");
        Ok(user)
    }

    fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<User> {
        let user = self.mutate_edge(
            user_id,
            friend_id,
            "DELETE FROM friends WHERE user_id = ?1 AND friend_id = ?2;",
        )?;
        debug!("event=friend_remove module=repo backend=sqlite status=ok user_id={user_id} friend_id={friend_id}");
        Ok(user)
    }
}

fn load_user(conn: &Connection, id: UserId) -> RepoResult<Option<User>> {
    let user = conn
        .query_row(
            &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
            [id],
            |row| Ok(parse_user_row(row)),
        )
        .optional()?
        .transpose()?;

    let Some(mut user) = user else {
        return Ok(None);
    };
    user.friends = load_friend_edges(conn, id)?;
    Ok(Some(user))
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: Some(row.get("id")?),
        email: row.get("email")?,
        login: row.get("login")?,
        name: row.get("name")?,
        birthday: row.get("birthday")?,
        friends: BTreeMap::new(),
    })
}

fn parse_confirmed(value: i64) -> RepoResult<FriendshipStatus> {
    match value {
        0 => Ok(FriendshipStatus::Pending),
        1 => Ok(FriendshipStatus::Confirmed),
        other => Err(RepoError::InvalidData(format!(
            "invalid is_confirmed value `{other}` in friends.is_confirmed"
        ))),
    }
}

fn load_friend_edges(
    conn: &Connection,
    user_id: UserId,
) -> RepoResult<BTreeMap<UserId, FriendshipStatus>> {
    let mut stmt = conn.prepare(
        "SELECT friend_id, is_confirmed
         FROM friends
         WHERE user_id = ?1
         ORDER BY friend_id ASC;",
    )?;
    let mut rows = stmt.query([user_id])?;
    let mut edges = BTreeMap::new();
    while let Some(row) = rows.next()? {
        edges.insert(row.get(0)?, parse_confirmed(row.get(1)?)?);
    }
    Ok(edges)
}

fn load_all_friend_edges(
    conn: &Connection,
) -> RepoResult<BTreeMap<UserId, BTreeMap<UserId, FriendshipStatus>>> {
    let mut stmt = conn.prepare("SELECT user_id, friend_id, is_confirmed FROM friends;")?;
    let mut rows = stmt.query([])?;
    let mut edges: BTreeMap<UserId, BTreeMap<UserId, FriendshipStatus>> = BTreeMap::new();
    while let Some(row) = rows.next()? {
        edges
            .entry(row.get(0)?)
            .or_default()
            .insert(row.get(1)?, parse_confirmed(row.get(2)?)?);
    }
    Ok(edges)
}
