//! Core runtime configuration.
//!
//! # Responsibility
//! - Resolve the deployment profile and its defaults.
//! - Normalize logging and service policy settings from the environment.
//!
//! # Invariants
//! - Unknown profile/level/policy names are rejected, never guessed.
//! - Unset variables fall back to profile defaults.

use crate::logging::normalize_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Profile selector variable.
pub const ENV_PROFILE: &str = "HBNB_ENV";
/// Log level override variable.
pub const ENV_LOG_LEVEL: &str = "HBNB_LOG_LEVEL";
/// Log directory variable; logging stays off when unset.
pub const ENV_LOG_DIR: &str = "HBNB_LOG_DIR";
/// Failed-update policy variable (`keep|rollback`).
pub const ENV_UPDATE_POLICY: &str = "HBNB_UPDATE_POLICY";

/// Deployment profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    #[default]
    Development,
    Testing,
    Production,
}

impl Profile {
    /// Parses a profile name; `default` selects development.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "default" => Ok(Self::Development),
            "testing" => Ok(Self::Testing),
            "production" => Ok(Self::Production),
            other => Err(ConfigError::UnknownProfile(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Production => "production",
        }
    }

    pub fn debug(self) -> bool {
        !matches!(self, Self::Production)
    }

    pub fn testing(self) -> bool {
        matches!(self, Self::Testing)
    }

    pub fn default_log_level(self) -> &'static str {
        if self.debug() {
            "debug"
        } else {
            "info"
        }
    }
}

/// What `update_user` does to the stored record when the patched user fails
/// validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidUpdatePolicy {
    /// Leave the patch applied and report the violations.
    #[default]
    KeepMutation,
    /// Restore the previous record, then report the violations.
    Rollback,
}

impl InvalidUpdatePolicy {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "keep" | "keep_mutation" => Ok(Self::KeepMutation),
            "rollback" => Ok(Self::Rollback),
            other => Err(ConfigError::UnknownUpdatePolicy(other.to_string())),
        }
    }
}

/// Resolved core configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub profile: Profile,
    pub log_level: &'static str,
    pub log_dir: Option<PathBuf>,
    pub on_invalid_update: InvalidUpdatePolicy,
}

impl CoreConfig {
    /// Defaults for `profile` with logging disabled.
    pub fn for_profile(profile: Profile) -> Self {
        Self {
            profile,
            log_level: profile.default_log_level(),
            log_dir: None,
            on_invalid_update: InvalidUpdatePolicy::default(),
        }
    }

    /// Reads configuration from the process environment.
    ///
    /// # Errors
    /// - Returns an error when any set variable holds an unsupported value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let profile = match read(ENV_PROFILE) {
            Some(value) => Profile::parse(&value)?,
            None => Profile::default(),
        };
        let mut config = Self::for_profile(profile);

        if let Some(value) = read(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&value)
                .map_err(|err| ConfigError::InvalidLogLevel(err.to_string()))?;
        }
        config.log_dir = read(ENV_LOG_DIR).map(|value| PathBuf::from(value.trim()));
        if let Some(value) = read(ENV_UPDATE_POLICY) {
            config.on_invalid_update = InvalidUpdatePolicy::parse(&value)?;
        }

        Ok(config)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::for_profile(Profile::default())
    }
}

/// Configuration resolution errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownProfile(String),
    InvalidLogLevel(String),
    UnknownUpdatePolicy(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownProfile(value) => write!(
                f,
                "unknown profile `{value}`; expected development|testing|production"
            ),
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
            Self::UnknownUpdatePolicy(value) => {
                write!(f, "unknown update policy `{value}`; expected keep|rollback")
            }
        }
    }
}

impl Error for ConfigError {}
