//! User repository contracts and in-memory implementation.
//!
//! # Responsibility
//! - Own the authoritative user collection for the process.
//! - Provide keyed CRUD primitives plus a transactional entry point so
//!   callers can run check-then-write sequences atomically.
//!
//! # Invariants
//! - A stored user is never overwritten by `insert`.
//! - Lookups are total: unknown or malformed ids yield `None`.
//! - Id lookups are exact key matches on the canonical id string.
//! - `update` applies only whitelisted fields and always refreshes
//!   `updated_at`.
//! - `list_all` returns users in insertion order.

use crate::model::user::{User, UserId, UserPatch};
use indexmap::IndexMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Store contract violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    /// `insert` was called with an id already present.
    DuplicateId(UserId),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "user id already stored: {id}"),
        }
    }
}

impl Error for RepoError {}

/// User collection keyed by id, kept in insertion order.
///
/// Only reachable through [`UserRepository::transaction`], so every access
/// happens while the repository guard is held.
#[derive(Debug, Default)]
pub struct UserTable {
    users: IndexMap<UserId, User>,
}

impl UserTable {
    /// Adds `user` keyed by its id.
    pub fn insert(&mut self, user: User) -> RepoResult<User> {
        if self.users.contains_key(&user.id) {
            return Err(RepoError::DuplicateId(user.id));
        }
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn get_by_id(&self, id: &str) -> Option<&User> {
        let key = parse_id(id)?;
        self.users.get(&key)
    }

    /// Case-sensitive exact email match; first hit in insertion order.
    pub fn get_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|user| user.email == email)
    }

    /// Applies `patch` to the stored user and returns the updated record.
    pub fn update(&mut self, id: &str, patch: &UserPatch) -> Option<&User> {
        let key = parse_id(id)?;
        let user = self.users.get_mut(&key)?;
        user.apply_patch(patch);
        Some(user)
    }

    /// Puts back a previously read record, keeping its position.
    ///
    /// Returns `false` when no user with that id is stored.
    pub fn restore(&mut self, snapshot: User) -> bool {
        match self.users.get_mut(&snapshot.id) {
            Some(slot) => {
                *slot = snapshot;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        match parse_id(id) {
            Some(key) => self.users.shift_remove(&key).is_some(),
            None => false,
        }
    }

    pub fn list_all(&self) -> Vec<User> {
        self.users.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Resolves `id` only when it is the exact stored spelling (lowercase,
/// hyphenated); other encodings of the same UUID are different keys.
fn parse_id(id: &str) -> Option<UserId> {
    let key = Uuid::parse_str(id).ok()?;
    (key.hyphenated().to_string() == id).then_some(key)
}

/// Repository interface for user storage.
///
/// Implementors provide `transaction`; the single-step operations run one
/// transaction each and hand out owned copies.
pub trait UserRepository {
    /// Runs `f` with exclusive access to the table.
    fn transaction<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&mut UserTable) -> T;

    fn insert(&self, user: User) -> RepoResult<User> {
        self.transaction(|table| table.insert(user))
    }

    fn get_by_id(&self, id: &str) -> Option<User> {
        self.transaction(|table| table.get_by_id(id).cloned())
    }

    fn get_by_email(&self, email: &str) -> Option<User> {
        self.transaction(|table| table.get_by_email(email).cloned())
    }

    fn update(&self, id: &str, patch: &UserPatch) -> Option<User> {
        self.transaction(|table| table.update(id, patch).cloned())
    }

    fn remove(&self, id: &str) -> bool {
        self.transaction(|table| table.remove(id))
    }

    fn list_all(&self) -> Vec<User> {
        self.transaction(|table| table.list_all())
    }

    fn len(&self) -> usize {
        self.transaction(|table| table.len())
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: UserRepository + ?Sized> UserRepository for &R {
    fn transaction<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&mut UserTable) -> T,
    {
        (**self).transaction(f)
    }
}

impl<R: UserRepository + ?Sized> UserRepository for Arc<R> {
    fn transaction<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&mut UserTable) -> T,
    {
        (**self).transaction(f)
    }
}

/// Process-lifetime user store guarded by a mutex.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: Mutex<UserTable>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for InMemoryUserRepository {
    fn transaction<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&mut UserTable) -> T,
    {
        // A panic inside an earlier transaction must not lock the store for
        // the rest of the process.
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *table)
    }
}
