//! Repository layer abstractions and storage implementations.
//!
//! # Responsibility
//! - Define the data access contract used by services.
//! - Keep collection and locking details away from business orchestration.
//!
//! # Invariants
//! - Repository lookups return `None` instead of failing.
//! - Multi-step checks run inside one `UserRepository::transaction`.

pub mod user_repo;
