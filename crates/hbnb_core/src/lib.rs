//! Core domain logic for the HBnB user API.
//! This crate is the single source of truth for user invariants.

pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig, InvalidUpdatePolicy, Profile};
pub use logging::{init_from_config, init_logging, logging_status, LoggingError};
pub use model::user::{is_valid_email, PatchFieldError, User, UserId, UserPatch, UserValidationError};
pub use repo::user_repo::{InMemoryUserRepository, RepoError, RepoResult, UserRepository, UserTable};
pub use service::user_service::{ErrorKind, UserService, UserServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Builds an in-memory user service configured by `config`.
pub fn in_memory_service(config: &CoreConfig) -> UserService<InMemoryUserRepository> {
    UserService::with_policy(InMemoryUserRepository::new(), config.on_invalid_update)
}
