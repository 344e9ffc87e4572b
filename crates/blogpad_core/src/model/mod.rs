//! Domain model for accounts, sessions and posts.
//!
//! # Responsibility
//! - Define the records persisted by the store and their serialized shape.
//! - Own input validation rules shared by signup, login and post creation.
//!
//! # Invariants
//! - An `Account` never carries a plaintext password, only its digest.
//! - A `Session` is a denormalized copy of an account's public fields.
//! - Posts are never updated in place.

pub mod account;
pub mod post;
pub mod validation;
