//! User use-case service.
//!
//! # Responsibility
//! - Validate and sequence user operations on top of a repository.
//! - Enforce business policy: unique emails, whitelisted updates, no
//!   deletion.
//! - Return every expected failure as a `UserServiceError` value.
//!
//! # Invariants
//! - A candidate that fails validation is never inserted.
//! - Uniqueness check and insert run in one repository transaction.
//! - Patch, re-validation and optional rollback run in one repository
//!   transaction.
//! - `delete_user` never removes anything.

use crate::config::InvalidUpdatePolicy;
use crate::model::user::{User, UserPatch, UserValidationError};
use crate::repo::user_repo::{RepoError, UserRepository};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Coarse error classes surfaced to transport adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Email already registered.
    Conflict,
    /// One or more field rules violated.
    Validation,
    /// No user with the given id.
    NotFound,
    /// Operation refused by product policy.
    PolicyDenied,
    /// Store contract breach.
    Internal,
}

impl ErrorKind {
    /// HTTP status a transport layer should answer with.
    ///
    /// Duplicate emails map to 400, matching the public API's historical
    /// behavior.
    pub fn http_status(self) -> u16 {
        match self {
            Self::Conflict | Self::Validation => 400,
            Self::NotFound => 404,
            Self::PolicyDenied => 403,
            Self::Internal => 500,
        }
    }
}

/// Errors from user service operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserServiceError {
    /// Another user already holds the email.
    EmailAlreadyExists,
    /// Complete list of violated field rules.
    Validation(Vec<UserValidationError>),
    /// Target user does not exist.
    UserNotFound(String),
    /// Deletion is disabled.
    DeletionNotAllowed,
    /// Repository-level failure.
    Repo(RepoError),
}

impl UserServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmailAlreadyExists => ErrorKind::Conflict,
            Self::Validation(_) => ErrorKind::Validation,
            Self::UserNotFound(_) => ErrorKind::NotFound,
            Self::DeletionNotAllowed => ErrorKind::PolicyDenied,
            Self::Repo(_) => ErrorKind::Internal,
        }
    }

    /// User-facing messages; one per violation for validation errors.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation(errors) => errors.iter().map(ToString::to_string).collect(),
            other => vec![other.to_string()],
        }
    }
}

impl Display for UserServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmailAlreadyExists => write!(f, "Email already exists"),
            Self::Validation(errors) => {
                let joined = errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(f, "{joined}")
            }
            Self::UserNotFound(_) => write!(f, "User not found"),
            Self::DeletionNotAllowed => write!(f, "User deletion is not allowed"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UserServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for UserServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<Vec<UserValidationError>> for UserServiceError {
    fn from(value: Vec<UserValidationError>) -> Self {
        Self::Validation(value)
    }
}

/// User service facade over repository implementations.
pub struct UserService<R: UserRepository> {
    repo: R,
    on_invalid_update: InvalidUpdatePolicy,
}

impl<R: UserRepository> UserService<R> {
    /// Creates a service with the default failed-update policy.
    pub fn new(repo: R) -> Self {
        Self::with_policy(repo, InvalidUpdatePolicy::default())
    }

    /// Creates a service with an explicit failed-update policy.
    pub fn with_policy(repo: R, on_invalid_update: InvalidUpdatePolicy) -> Self {
        Self {
            repo,
            on_invalid_update,
        }
    }

    pub fn invalid_update_policy(&self) -> InvalidUpdatePolicy {
        self.on_invalid_update
    }

    /// Creates one user.
    ///
    /// # Contract
    /// - Email collision is reported before field validation.
    /// - Validation failures carry every violated rule.
    pub fn create_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, UserServiceError> {
        let result = self.repo.transaction(|table| -> Result<User, UserServiceError> {
            if table.get_by_email(email).is_some() {
                return Err(UserServiceError::EmailAlreadyExists);
            }

            let candidate = User::new(first_name, last_name, email, password);
            candidate.validate()?;
            Ok(table.insert(candidate)?)
        });

        match &result {
            Ok(user) => info!(
                "event=user_create module=service status=ok user_id={}",
                user.id
            ),
            Err(err) => warn!(
                "event=user_create module=service status=error kind={:?}",
                err.kind()
            ),
        }
        result
    }

    /// Gets one user by id; unknown or malformed ids yield `None`.
    pub fn get_user(&self, id: &str) -> Option<User> {
        self.repo.get_by_id(id)
    }

    /// Gets one user by exact email.
    pub fn get_user_by_email(&self, email: &str) -> Option<User> {
        self.repo.get_by_email(email)
    }

    /// Applies a whitelisted patch and re-validates the resulting user.
    ///
    /// # Contract
    /// - Unknown id returns `UserNotFound` without touching the store.
    /// - An email held by another user returns `EmailAlreadyExists` without
    ///   touching the store.
    /// - On validation failure the stored record is kept or rolled back per
    ///   [`InvalidUpdatePolicy`].
    pub fn update_user(&self, id: &str, patch: &UserPatch) -> Result<User, UserServiceError> {
        let policy = self.on_invalid_update;
        let result = self.repo.transaction(|table| -> Result<User, UserServiceError> {
            let snapshot = table
                .get_by_id(id)
                .cloned()
                .ok_or_else(|| UserServiceError::UserNotFound(id.to_string()))?;

            if let Some(email) = patch.email.as_deref() {
                let taken = table
                    .get_by_email(email)
                    .is_some_and(|holder| holder.id != snapshot.id);
                if taken {
                    return Err(UserServiceError::EmailAlreadyExists);
                }
            }

            let updated = table
                .update(id, patch)
                .cloned()
                .ok_or_else(|| UserServiceError::UserNotFound(id.to_string()))?;

            if let Err(errors) = updated.validate() {
                if policy == InvalidUpdatePolicy::Rollback {
                    if table.restore(snapshot) {
                        debug!(
                            "event=user_update_rollback module=service status=ok user_id={}",
                            updated.id
                        );
                    } else {
                        warn!(
                            "event=user_update_rollback module=service status=error user_id={} reason=record_missing",
                            updated.id
                        );
                    }
                }
                return Err(UserServiceError::Validation(errors));
            }

            Ok(updated)
        });

        match &result {
            Ok(user) => info!(
                "event=user_update module=service status=ok user_id={}",
                user.id
            ),
            Err(err) => warn!(
                "event=user_update module=service status=error kind={:?} policy={:?}",
                err.kind(),
                policy
            ),
        }
        result
    }

    /// Always refuses: user deletion is disabled.
    pub fn delete_user(&self, _id: &str) -> Result<bool, UserServiceError> {
        warn!("event=user_delete module=service status=error kind=PolicyDenied");
        Err(UserServiceError::DeletionNotAllowed)
    }

    /// Lists all users in insertion order.
    pub fn list_users(&self) -> Vec<User> {
        self.repo.list_all()
    }
}
