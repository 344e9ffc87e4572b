//! Core domain logic for Blogpad.
//! This crate is the single source of truth for account, session and post
//! invariants; renderers and shells only call into it.

pub mod db;
pub mod image_codec;
pub mod logging;
pub mod model;
pub mod password;
pub mod repo;
pub mod service;
pub mod view;

pub use image_codec::{compress_image, fit_dimensions, ImageCodecError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::account::{Account, Session};
pub use model::post::{default_posts, Post, PostId};
pub use model::validation::ValidationError;
pub use password::hash_password;
pub use repo::record_repo::{
    RecordKey, RecordRepository, RepoError, RepoResult, SqliteRecordRepository,
};
pub use service::blog_store::{AuthError, BlogStore, ConflictError, StoreError, StoreResult};
pub use service::session_manager::{SessionManager, SessionState};
pub use view::{feed_cards, manage_list, PostCard};

/// Minimal health-check API for shell integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
