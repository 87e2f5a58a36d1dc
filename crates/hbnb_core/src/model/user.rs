//! User domain model.
//!
//! # Responsibility
//! - Define the canonical user record held by the store.
//! - Own field-level validation rules for candidate and updated users.
//! - Define the enumerated patch shape used by update paths.
//!
//! # Invariants
//! - `id` is stable and never reused for another user.
//! - `created_at <= updated_at`; both are equal right after construction.
//! - `password` never leaves the process through `Serialize` or `Debug`.
//! - `UserPatch` cannot express changes to `id`, timestamps, or `password`.

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a user record.
pub type UserId = Uuid;

/// Maximum accepted length (in characters) for first/last names.
pub const NAME_MAX_CHARS: usize = 50;
/// Minimum accepted length (in characters) for passwords.
pub const PASSWORD_MIN_CHARS: usize = 6;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// One violated field rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserValidationError {
    FirstNameRequired,
    FirstNameTooLong,
    LastNameRequired,
    LastNameTooLong,
    InvalidEmail,
    PasswordTooShort,
}

impl UserValidationError {
    /// Field name the violation belongs to.
    pub fn field(self) -> &'static str {
        match self {
            Self::FirstNameRequired | Self::FirstNameTooLong => "first_name",
            Self::LastNameRequired | Self::LastNameTooLong => "last_name",
            Self::InvalidEmail => "email",
            Self::PasswordTooShort => "password",
        }
    }
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstNameRequired => write!(f, "First name is required"),
            Self::FirstNameTooLong => write!(
                f,
                "First name must be less than {NAME_MAX_CHARS} characters"
            ),
            Self::LastNameRequired => write!(f, "Last name is required"),
            Self::LastNameTooLong => {
                write!(f, "Last name must be less than {NAME_MAX_CHARS} characters")
            }
            Self::InvalidEmail => write!(f, "Invalid email format"),
            Self::PasswordTooShort => write!(
                f,
                "Password must be at least {PASSWORD_MIN_CHARS} characters"
            ),
        }
    }
}

impl Error for UserValidationError {}

/// Canonical user record.
///
/// Serialized shape is `id, first_name, last_name, email, is_admin,
/// created_at, updated_at`; timestamps render as RFC 3339 strings.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Plain credential. Hashing is out of scope for this core.
    #[serde(skip_serializing)]
    password: String,
    pub is_admin: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Builds a candidate user with a fresh id and equal timestamps.
    ///
    /// The candidate is not validated here; callers run [`User::validate`].
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            password: password.into(),
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies whitelisted patch fields and refreshes `updated_at`.
    pub fn apply_patch(&mut self, patch: &UserPatch) {
        if let Some(first_name) = &patch.first_name {
            self.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &patch.last_name {
            self.last_name.clone_from(last_name);
        }
        if let Some(email) = &patch.email {
            self.email.clone_from(email);
        }
        if let Some(is_admin) = patch.is_admin {
            self.is_admin = is_admin;
        }
        self.touch();
    }

    /// Moves `updated_at` forward.
    ///
    /// The new value is strictly greater than the previous one even when the
    /// wall clock has not advanced (or stepped backwards).
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }

    /// Checks every field rule and returns all violations at once.
    pub fn validate(&self) -> Result<(), Vec<UserValidationError>> {
        let mut errors = Vec::new();

        if let Some(err) = check_name(
            &self.first_name,
            UserValidationError::FirstNameRequired,
            UserValidationError::FirstNameTooLong,
        ) {
            errors.push(err);
        }
        if let Some(err) = check_name(
            &self.last_name,
            UserValidationError::LastNameRequired,
            UserValidationError::LastNameTooLong,
        ) {
            errors.push(err);
        }
        if !is_valid_email(&self.email) {
            errors.push(UserValidationError::InvalidEmail);
        }
        if self.password.chars().count() < PASSWORD_MIN_CHARS {
            errors.push(UserValidationError::PasswordTooShort);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Debug for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("is_admin", &self.is_admin)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Returns whether `email` matches the accepted address shape.
///
/// Shape only; no domain or MX verification.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn check_name(
    value: &str,
    required: UserValidationError,
    too_long: UserValidationError,
) -> Option<UserValidationError> {
    if value.trim().is_empty() {
        Some(required)
    } else if value.chars().count() > NAME_MAX_CHARS {
        Some(too_long)
    } else {
        None
    }
}

const PROTECTED_FIELDS: &[&str] = &["id", "created_at", "updated_at", "password"];

/// Whitelisted changes for one user update.
///
/// `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub is_admin: Option<bool>,
}

impl UserPatch {
    /// Builds a patch from loosely typed `key -> value` pairs.
    ///
    /// Protected keys (`id`, `created_at`, `updated_at`, `password`) and
    /// unknown keys are ignored.
    ///
    /// # Errors
    /// - Returns an error when `is_admin` is not `true` or `false`.
    pub fn from_fields<I, K, V>(fields: I) -> Result<Self, PatchFieldError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut patch = Self::default();
        for (key, value) in fields {
            match key.as_ref() {
                "first_name" => patch.first_name = Some(value.into()),
                "last_name" => patch.last_name = Some(value.into()),
                "email" => patch.email = Some(value.into()),
                "is_admin" => {
                    let raw: String = value.into();
                    let parsed = raw.trim().parse::<bool>().map_err(|_| {
                        PatchFieldError::InvalidBool {
                            field: "is_admin",
                            value: raw.clone(),
                        }
                    })?;
                    patch.is_admin = Some(parsed);
                }
                other if PROTECTED_FIELDS.contains(&other) => {
                    log::debug!(
                        "event=patch_field_ignored module=model status=ok field={other} reason=protected"
                    );
                }
                other => {
                    log::debug!(
                        "event=patch_field_ignored module=model status=ok field={other} reason=unknown"
                    );
                }
            }
        }
        Ok(patch)
    }

    /// Returns whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.is_admin.is_none()
    }
}

/// Errors from building a patch out of string fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchFieldError {
    InvalidBool { field: &'static str, value: String },
}

impl Display for PatchFieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBool { field, value } => {
                write!(f, "field `{field}` expects true|false, got `{value}`")
            }
        }
    }
}

impl Error for PatchFieldError {}

#[cfg(test)]
mod tests {
    use super::{is_valid_email, User, UserPatch, UserValidationError};

    #[test]
    fn email_pattern_accepts_common_shapes() {
        assert!(is_valid_email("john.doe@example.com"));
        assert!(is_valid_email("a+tag@mail.example.co"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("x@y.c"));
        assert!(!is_valid_email("x@example.c0m"));
    }

    #[test]
    fn validate_reports_every_violation() {
        let user = User::new("  ", "", "bad", "123");
        let errors = user.validate().expect_err("all fields are invalid");
        assert_eq!(
            errors,
            vec![
                UserValidationError::FirstNameRequired,
                UserValidationError::LastNameRequired,
                UserValidationError::InvalidEmail,
                UserValidationError::PasswordTooShort,
            ]
        );
        assert_eq!(errors[2].field(), "email");
    }

    #[test]
    fn name_length_is_counted_in_characters() {
        let fifty = "é".repeat(50);
        let user = User::new(fifty.as_str(), "Doe", "a@b.io", "secret");
        assert!(user.validate().is_ok());

        let user = User::new("x".repeat(51), "Doe", "a@b.io", "secret");
        assert_eq!(
            user.validate().unwrap_err(),
            vec![UserValidationError::FirstNameTooLong]
        );
    }

    #[test]
    fn touch_is_strictly_monotonic() {
        let mut user = User::new("John", "Doe", "john@example.com", "secret");
        let before = user.updated_at();
        user.touch();
        assert!(user.updated_at() > before);
        assert_eq!(user.created_at(), before);
    }

    #[test]
    fn from_fields_ignores_protected_and_unknown_keys() {
        let patch = UserPatch::from_fields([
            ("id", "other"),
            ("password", "hunter22"),
            ("nickname", "jd"),
            ("last_name", "Smith"),
        ])
        .unwrap();
        assert_eq!(
            patch,
            UserPatch {
                last_name: Some("Smith".to_string()),
                ..UserPatch::default()
            }
        );
    }

    #[test]
    fn from_fields_rejects_non_bool_admin_flag() {
        let err = UserPatch::from_fields([("is_admin", "yes")]).unwrap_err();
        assert!(err.to_string().contains("is_admin"));
    }

    #[test]
    fn debug_output_redacts_password() {
        let user = User::new("John", "Doe", "john@example.com", "topsecret");
        let rendered = format!("{user:?}");
        assert!(!rendered.contains("topsecret"));
        assert!(rendered.contains("<redacted>"));
    }
}
