//! Active session tracking.
//!
//! # Responsibility
//! - Hold at most one authenticated identity in memory.
//! - Mirror every change to the `currentUser` record.
//!
//! # Invariants
//! - The in-memory session changes only after the durable write succeeded.
//! - Establishing a session overwrites any previous one.

use crate::model::account::Session;
use crate::repo::record_repo::{RecordKey, RecordRepository, RepoError, RepoResult};
use log::info;

/// Authentication state of a store instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionManager {
    current: Option<Session>,
}

impl SessionManager {
    /// Restores the persisted session, if any.
    ///
    /// A stored JSON `null` is treated the same as a missing record.
    pub fn load<R: RecordRepository>(repo: &R) -> RepoResult<Self> {
        let current = match repo.read_record(RecordKey::Session)? {
            Some(text) => serde_json::from_str::<Option<Session>>(&text).map_err(|err| {
                RepoError::InvalidData {
                    key: RecordKey::Session,
                    message: err.to_string(),
                }
            })?,
            None => None,
        };
        Ok(Self { current })
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn state(&self) -> SessionState {
        if self.current.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    /// Persists `session` and makes it the active identity.
    pub fn establish<R: RecordRepository>(&mut self, repo: &R, session: Session) -> RepoResult<()> {
        let text = serde_json::to_string(&session).map_err(|source| RepoError::Serialize {
            key: RecordKey::Session,
            source,
        })?;
        repo.write_record(RecordKey::Session, &text)?;
        let replaced = self.current.replace(session).is_some();
        info!("event=session_establish module=service status=ok replaced={replaced}");
        Ok(())
    }

    /// Removes the session from storage and memory.
    pub fn clear<R: RecordRepository>(&mut self, repo: &R) -> RepoResult<()> {
        repo.remove_record(RecordKey::Session)?;
        let had_session = self.current.take().is_some();
        info!("event=session_clear module=service status=ok had_session={had_session}");
        Ok(())
    }
}
