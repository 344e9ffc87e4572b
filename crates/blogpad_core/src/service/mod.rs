//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, hashing and record persistence into use-case APIs.
//! - Keep callers (CLI, renderers) decoupled from storage details.

pub mod blog_store;
pub mod session_manager;
