//! Record repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Store three named JSON records: accounts, posts and the active session.
//! - Reject connections whose schema was never migrated.
//!
//! # Invariants
//! - `write_record` fully replaces the previous value for its key.
//! - `remove_record` on a missing key is a no-op.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Names of the durable records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Accounts,
    Posts,
    Session,
}

impl RecordKey {
    /// Storage key. Kept identical to the names used by the browser build.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accounts => "users",
            Self::Posts => "blogPosts",
            Self::Session => "currentUser",
        }
    }
}

impl Display for RecordKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistence and decoding failures.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Serializing a record for storage failed.
    Serialize {
        key: RecordKey,
        source: serde_json::Error,
    },
    /// Stored record could not be decoded.
    InvalidData {
        key: RecordKey,
        message: String,
    },
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    /// Non-SQLite backend refused the operation, e.g. a browser-style
    /// storage quota. `SqliteRecordRepository` reports disk-full and similar
    /// conditions as `Db(Sqlite(..))` instead.
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialize { key, source } => {
                write!(f, "failed to serialize record `{key}`: {source}")
            }
            Self::InvalidData { key, message } => {
                write!(f, "invalid persisted record `{key}`: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::Unavailable(message) => write!(f, "record storage unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialize { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Whole-record key-value storage.
pub trait RecordRepository {
    /// Returns the stored text for `key`, or `None` when never written.
    fn read_record(&self, key: RecordKey) -> RepoResult<Option<String>>;
    /// Overwrites the stored text for `key`.
    fn write_record(&self, key: RecordKey, value: &str) -> RepoResult<()>;
    /// Deletes the record for `key` if present.
    fn remove_record(&self, key: RecordKey) -> RepoResult<()>;
}

impl<T: RecordRepository + ?Sized> RecordRepository for &T {
    fn read_record(&self, key: RecordKey) -> RepoResult<Option<String>> {
        (**self).read_record(key)
    }

    fn write_record(&self, key: RecordKey, value: &str) -> RepoResult<()> {
        (**self).write_record(key, value)
    }

    fn remove_record(&self, key: RecordKey) -> RepoResult<()> {
        (**self).remove_record(key)
    }
}

/// SQLite-backed record repository.
pub struct SqliteRecordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` when the `records` table is absent.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let has_records: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'records'
            );",
            [],
            |row| row.get(0),
        )?;
        if has_records == 0 {
            return Err(RepoError::MissingRequiredTable("records"));
        }

        Ok(Self { conn })
    }
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn read_record(&self, key: RecordKey) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM records WHERE key = ?1;",
                [key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_record(&self, key: RecordKey, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO records (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key.as_str(), value],
        )?;
        Ok(())
    }

    fn remove_record(&self, key: RecordKey) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM records WHERE key = ?1;", [key.as_str()])?;
        Ok(())
    }
}
