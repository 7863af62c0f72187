#![forbid(unsafe_code)]

use super::{StoreError, now_ms};
use rusqlite::{Connection, OptionalExtension, params};

pub(super) const SCHEMA_VERSION: i64 = 1;

const REQUIRED_TABLES: [&str; 8] = [
    "tracker_state",
    "users",
    "statuses",
    "priorities",
    "tags",
    "issues",
    "issue_tags",
    "comments",
];

/// Refuses to touch a database that was not created by this schema. An empty
/// database passes and gets installed.
pub(super) fn preflight_gate(conn: &Connection) -> Result<(), StoreError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    if tables.is_empty() {
        return Ok(());
    }

    if let Some(foreign) = tables
        .iter()
        .find(|table| !REQUIRED_TABLES.contains(&table.as_str()))
    {
        tracing::warn!(table = %foreign, "database holds a table this schema does not know");
        return Err(StoreError::ResetRequired("unsupported tables detected"));
    }
    if let Some(missing) = REQUIRED_TABLES
        .iter()
        .find(|required| !tables.iter().any(|table| table == *required))
    {
        tracing::warn!(table = %missing, "database is missing a schema table");
        return Err(StoreError::ResetRequired("required table is missing"));
    }

    let version = conn
        .query_row(
            "SELECT schema_version FROM tracker_state WHERE singleton=1",
            [],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;

    match version {
        Some(v) if v == SCHEMA_VERSION => Ok(()),
        Some(_) => Err(StoreError::ResetRequired("schema version mismatch")),
        None => Err(StoreError::ResetRequired("schema state row is missing")),
    }
}

pub(super) fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    let now_ms = now_ms();

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS tracker_state (
          singleton INTEGER PRIMARY KEY CHECK(singleton = 1),
          schema_version INTEGER NOT NULL,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS users (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL CHECK(length(name) > 0),
          email TEXT NOT NULL UNIQUE CHECK(length(email) > 0),
          password_digest TEXT NOT NULL CHECK(length(password_digest) > 0),
          role TEXT NOT NULL DEFAULT 'user' CHECK(role IN ('user', 'admin')),
          created_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS statuses (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL UNIQUE CHECK(length(name) > 0)
        );

        CREATE TABLE IF NOT EXISTS priorities (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL UNIQUE CHECK(length(name) > 0)
        );

        CREATE TABLE IF NOT EXISTS tags (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL CHECK(length(name) > 0),
          color TEXT
        );

        CREATE TABLE IF NOT EXISTS issues (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          title TEXT NOT NULL CHECK(length(title) > 0),
          description TEXT,
          status_id INTEGER NOT NULL
            REFERENCES statuses(id) ON DELETE RESTRICT,
          priority_id INTEGER NOT NULL
            REFERENCES priorities(id) ON DELETE RESTRICT,
          author_id INTEGER NOT NULL
            REFERENCES users(id) ON DELETE CASCADE,
          assignee_id INTEGER
            REFERENCES users(id) ON DELETE SET NULL,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          CHECK(updated_at_ms >= created_at_ms)
        );

        CREATE INDEX IF NOT EXISTS idx_issues_updated
          ON issues(updated_at_ms DESC, id DESC);
        CREATE INDEX IF NOT EXISTS idx_issues_status ON issues(status_id);
        CREATE INDEX IF NOT EXISTS idx_issues_priority ON issues(priority_id);
        CREATE INDEX IF NOT EXISTS idx_issues_author ON issues(author_id);

        CREATE TABLE IF NOT EXISTS issue_tags (
          issue_id INTEGER NOT NULL
            REFERENCES issues(id) ON DELETE CASCADE,
          tag_id INTEGER NOT NULL
            REFERENCES tags(id) ON DELETE CASCADE,
          PRIMARY KEY(issue_id, tag_id)
        );

        CREATE INDEX IF NOT EXISTS idx_issue_tags_tag ON issue_tags(tag_id, issue_id);

        CREATE TABLE IF NOT EXISTS comments (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          issue_id INTEGER NOT NULL
            REFERENCES issues(id) ON DELETE CASCADE,
          author_id INTEGER NOT NULL
            REFERENCES users(id) ON DELETE CASCADE,
          content TEXT NOT NULL CHECK(length(content) > 0),
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          CHECK(updated_at_ms >= created_at_ms)
        );

        CREATE INDEX IF NOT EXISTS idx_comments_issue ON comments(issue_id);
        CREATE INDEX IF NOT EXISTS idx_comments_updated
          ON comments(updated_at_ms DESC, id DESC);
        "#,
    )?;

    conn.execute(
        "INSERT INTO tracker_state(singleton, schema_version, created_at_ms, updated_at_ms) \
         VALUES (1, ?1, ?2, ?2) \
         ON CONFLICT(singleton) DO UPDATE SET schema_version=excluded.schema_version, updated_at_ms=excluded.updated_at_ms",
        params![SCHEMA_VERSION, now_ms],
    )?;

    tracing::debug!(version = SCHEMA_VERSION, "schema installed");
    Ok(())
}
