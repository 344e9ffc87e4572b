//! Account and session records.
//!
//! # Invariants
//! - `email` is unique across the account collection (exact, case-sensitive).
//! - `password_digest` is the 64-char hex output of `hash_password`.
//! - Accounts are immutable once created.

use serde::{Deserialize, Serialize};

/// Registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Display name, at least three characters.
    pub name: String,
    pub email: String,
    /// Serialized as `password` to stay compatible with existing blobs.
    #[serde(rename = "password")]
    pub password_digest: String,
}

impl Account {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_digest: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password_digest: password_digest.into(),
        }
    }

    /// Returns the public projection used as the active session.
    pub fn to_session(&self) -> Session {
        Session {
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Authenticated identity. Never carries the password digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::Account;

    #[test]
    fn digest_serializes_under_password_key() {
        let account = Account::new("Ada", "ada@example.com", "ab".repeat(32));
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["password"], "ab".repeat(32));
        assert!(json.get("password_digest").is_none());
    }

    #[test]
    fn session_projection_drops_digest() {
        let account = Account::new("Ada", "ada@example.com", "ff".repeat(32));
        let session = account.to_session();
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["name"], "Ada");
        assert_eq!(json["email"], "ada@example.com");
        assert!(json.get("password").is_none());
    }
}
