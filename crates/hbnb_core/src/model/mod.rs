//! Domain model for the user core.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep field validation next to the record it checks.
//!
//! # Invariants
//! - Every user is identified by a stable `UserId`.
//! - Credentials are never part of a serialized user.

pub mod user;
