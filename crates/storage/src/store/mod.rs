#![forbid(unsafe_code)]

mod comments;
mod error;
mod issues;
mod query;
mod requests;
mod schema;
mod tags;
mod taxonomy;
mod users;

pub use error::StoreError;
pub use requests::*;

use rusqlite::{Connection, ErrorCode};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DB_FILE_NAME: &str = "issue_tracker.db";

/// Canonical entity state. Every mutating method runs in a single SQLite
/// transaction; callers that share a store across threads wrap it in a lock.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Opens (or creates) `issue_tracker.db` inside `storage_dir`.
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref();
        std::fs::create_dir_all(storage_dir)?;
        Self::open_path(storage_dir.join(DB_FILE_NAME))
    }

    pub fn open_path(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&db_path)?;
        Self::prepare(conn, Some(db_path))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::prepare(Connection::open_in_memory()?, None)
    }

    fn prepare(conn: Connection, db_path: Option<PathBuf>) -> Result<Self, StoreError> {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        schema::preflight_gate(&conn)?;
        schema::install_schema(&conn)?;

        tracing::debug!(path = ?db_path, "issue tracker store opened");
        Ok(Self { conn, db_path })
    }

    /// `None` for in-memory stores.
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }
}

fn now_ms() -> i64 {
    tracker_core::timestamp::now_ms()
}

/// Timestamp for a mutation of a row last touched at `previous_ms`. Never
/// moves backwards even if the wall clock does.
fn touched_at(previous_ms: i64) -> i64 {
    now_ms().max(previous_ms)
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => {
            code.code == ErrorCode::ConstraintViolation
                || message.as_deref().is_some_and(|value| {
                    value.contains("UNIQUE constraint failed")
                        || value.contains("FOREIGN KEY constraint failed")
                })
        }
        _ => false,
    }
}

fn to_sqlite_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
