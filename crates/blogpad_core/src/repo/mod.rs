//! Durable record storage.
//!
//! # Responsibility
//! - Define the key-value contract the store persists through.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Records are read and written whole; there are no partial updates.
//! - Repository APIs surface malformed persisted data instead of masking it.

pub mod record_repo;
