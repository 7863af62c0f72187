#![forbid(unsafe_code)]

//! Statuses and priorities, plus the guard that keeps issues from pointing at
//! a deleted one.

use super::*;
use rusqlite::{OptionalExtension, params};
use tracker_core::model::{TaxonomyEntry, TaxonomyKind};
use tracker_core::text::{self, MAX_TAXONOMY_NAME};
use tracker_core::view::{IssueSummary, TaxonomyUsage};

impl SqliteStore {
    pub fn create_taxonomy(
        &mut self,
        kind: TaxonomyKind,
        name: &str,
    ) -> Result<TaxonomyEntry, StoreError> {
        let name = text::required_line("name", name, MAX_TAXONOMY_NAME)?;

        let tx = self.conn.transaction()?;
        if taxonomy_by_name(&tx, kind, &name)?.is_some() {
            return Err(StoreError::DuplicateName { kind, name });
        }
        let insert = tx.execute(
            &format!("INSERT INTO {}(name) VALUES (?1)", kind.table()),
            params![name],
        );
        if let Err(err) = insert {
            return Err(map_name_conflict(err, kind, &name));
        }
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(TaxonomyEntry { kind, id, name })
    }

    pub fn list_taxonomy(&self, kind: TaxonomyKind) -> Result<Vec<TaxonomyEntry>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, name FROM {} ORDER BY id ASC",
            kind.table()
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok(TaxonomyEntry {
                kind,
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_taxonomy(
        &self,
        kind: TaxonomyKind,
        id: i64,
    ) -> Result<Option<TaxonomyEntry>, StoreError> {
        taxonomy_by_id(&self.conn, kind, id)
    }

    pub fn find_taxonomy_by_name(
        &self,
        kind: TaxonomyKind,
        name: &str,
    ) -> Result<Option<TaxonomyEntry>, StoreError> {
        taxonomy_by_name(&self.conn, kind, name.trim())
    }

    /// Renames regardless of usage. Uniqueness is checked against every other
    /// entry, so renaming to the current name is a no-op success.
    pub fn rename_taxonomy(
        &mut self,
        kind: TaxonomyKind,
        id: i64,
        name: &str,
    ) -> Result<TaxonomyEntry, StoreError> {
        let name = text::required_line("name", name, MAX_TAXONOMY_NAME)?;

        let tx = self.conn.transaction()?;
        if taxonomy_by_id(&tx, kind, id)?.is_none() {
            return Err(StoreError::not_found(kind, id));
        }
        if let Some(existing) = taxonomy_by_name(&tx, kind, &name)?
            && existing.id != id
        {
            return Err(StoreError::DuplicateName { kind, name });
        }
        let update = tx.execute(
            &format!("UPDATE {} SET name=?2 WHERE id=?1", kind.table()),
            params![id, name],
        );
        if let Err(err) = update {
            return Err(map_name_conflict(err, kind, &name));
        }
        tx.commit()?;

        Ok(TaxonomyEntry { kind, id, name })
    }

    pub fn taxonomy_usage(
        &self,
        kind: TaxonomyKind,
        id: i64,
    ) -> Result<TaxonomyUsage, StoreError> {
        if taxonomy_by_id(&self.conn, kind, id)?.is_none() {
            return Err(StoreError::not_found(kind, id));
        }
        Ok(TaxonomyUsage::from_references(referencing_issues(
            &self.conn, kind, id,
        )?))
    }

    /// Deletes only when no issue references the entry; otherwise reports
    /// every referencing issue and leaves state untouched.
    pub fn delete_taxonomy(&mut self, kind: TaxonomyKind, id: i64) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        if taxonomy_by_id(&tx, kind, id)?.is_none() {
            return Err(StoreError::not_found(kind, id));
        }
        let issues = referencing_issues(&tx, kind, id)?;
        if !issues.is_empty() {
            return Err(StoreError::ReferentialConflict { kind, id, issues });
        }
        tx.execute(
            &format!("DELETE FROM {} WHERE id=?1", kind.table()),
            params![id],
        )?;
        tx.commit()?;
        Ok(())
    }
}

pub(super) fn taxonomy_by_id(
    conn: &Connection,
    kind: TaxonomyKind,
    id: i64,
) -> Result<Option<TaxonomyEntry>, StoreError> {
    Ok(conn
        .query_row(
            &format!("SELECT id, name FROM {} WHERE id=?1", kind.table()),
            params![id],
            |row| {
                Ok(TaxonomyEntry {
                    kind,
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?)
}

pub(super) fn ensure_taxonomy_reference(
    conn: &Connection,
    kind: TaxonomyKind,
    id: i64,
) -> Result<(), StoreError> {
    match taxonomy_by_id(conn, kind, id)? {
        Some(_) => Ok(()),
        None => Err(StoreError::invalid_reference(kind, id)),
    }
}

fn taxonomy_by_name(
    conn: &Connection,
    kind: TaxonomyKind,
    name: &str,
) -> Result<Option<TaxonomyEntry>, StoreError> {
    Ok(conn
        .query_row(
            &format!("SELECT id, name FROM {} WHERE name=?1", kind.table()),
            params![name],
            |row| {
                Ok(TaxonomyEntry {
                    kind,
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?)
}

fn referencing_issues(
    conn: &Connection,
    kind: TaxonomyKind,
    id: i64,
) -> Result<Vec<IssueSummary>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, title FROM issues WHERE {}=?1 ORDER BY id ASC",
        kind.issue_column()
    ))?;
    let rows = stmt.query_map(params![id], |row| {
        Ok(IssueSummary {
            id: row.get(0)?,
            title: row.get(1)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn map_name_conflict(err: rusqlite::Error, kind: TaxonomyKind, name: &str) -> StoreError {
    if is_constraint_violation(&err) {
        return StoreError::DuplicateName {
            kind,
            name: name.to_string(),
        };
    }
    StoreError::Sql(err)
}
