#![forbid(unsafe_code)]

use super::taxonomy::ensure_taxonomy_reference;
use super::users::user_exists;
use super::*;
use rusqlite::{OptionalExtension, Transaction, params};
use std::collections::BTreeSet;
use tracker_core::ids::{IssueId, TagId, UserId};
use tracker_core::model::{EntityKind, Issue, TaxonomyKind};
use tracker_core::text::{self, MAX_BODY, MAX_TITLE};

impl SqliteStore {
    pub fn create_issue(&mut self, request: CreateIssueRequest) -> Result<Issue, StoreError> {
        let CreateIssueRequest {
            title,
            description,
            status_id,
            priority_id,
            author_id,
            assignee_id,
            tag_ids,
        } = request;

        let title = text::required_line("title", &title, MAX_TITLE)?;
        let description = text::optional_text("description", description.as_deref(), MAX_BODY)?;
        let tag_ids = dedup_tags(tag_ids);

        let tx = self.conn.transaction()?;
        ensure_taxonomy_reference(&tx, TaxonomyKind::Status, status_id)?;
        ensure_taxonomy_reference(&tx, TaxonomyKind::Priority, priority_id)?;
        ensure_user_reference(&tx, author_id)?;
        if let Some(assignee_id) = assignee_id {
            ensure_user_reference(&tx, assignee_id)?;
        }
        ensure_tag_references(&tx, &tag_ids)?;

        let now_ms = now_ms();
        tx.execute(
            "INSERT INTO issues(title, description, status_id, priority_id, author_id, assignee_id, created_at_ms, updated_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                title,
                description,
                status_id,
                priority_id,
                author_id,
                assignee_id,
                now_ms
            ],
        )?;
        let id = tx.last_insert_rowid();
        replace_tags_tx(&tx, id, &tag_ids)?;
        tx.commit()?;

        Ok(Issue {
            id,
            title,
            description,
            status_id,
            priority_id,
            author_id,
            assignee_id,
            tag_ids,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        })
    }

    pub fn get_issue(&self, id: IssueId) -> Result<Option<Issue>, StoreError> {
        issue_by_id(&self.conn, id)
    }

    /// Applies every field of `patch` or none of them. A patch with no fields
    /// still refreshes `updated_at`.
    pub fn update_issue(&mut self, id: IssueId, patch: IssuePatch) -> Result<Issue, StoreError> {
        let IssuePatch {
            title,
            description,
            status_id,
            priority_id,
            assignee_id,
            tag_ids,
        } = patch;

        let title = title
            .as_deref()
            .map(|value| text::required_line("title", value, MAX_TITLE))
            .transpose()?;
        let description = description
            .map(|value| text::optional_text("description", value.as_deref(), MAX_BODY))
            .transpose()?;
        let tag_ids = tag_ids.map(dedup_tags);

        let tx = self.conn.transaction()?;
        let mut issue =
            issue_by_id(&tx, id)?.ok_or(StoreError::not_found(EntityKind::Issue, id))?;

        if let Some(status_id) = status_id {
            ensure_taxonomy_reference(&tx, TaxonomyKind::Status, status_id)?;
            issue.status_id = status_id;
        }
        if let Some(priority_id) = priority_id {
            ensure_taxonomy_reference(&tx, TaxonomyKind::Priority, priority_id)?;
            issue.priority_id = priority_id;
        }
        if let Some(assignee_id) = assignee_id {
            if let Some(user_id) = assignee_id {
                ensure_user_reference(&tx, user_id)?;
            }
            issue.assignee_id = assignee_id;
        }
        if let Some(tag_ids) = tag_ids {
            ensure_tag_references(&tx, &tag_ids)?;
            replace_tags_tx(&tx, id, &tag_ids)?;
            issue.tag_ids = tag_ids;
        }
        if let Some(title) = title {
            issue.title = title;
        }
        if let Some(description) = description {
            issue.description = description;
        }
        issue.updated_at_ms = touched_at(issue.updated_at_ms);

        tx.execute(
            "UPDATE issues SET title=?2, description=?3, status_id=?4, priority_id=?5, assignee_id=?6, updated_at_ms=?7 \
             WHERE id=?1",
            params![
                id,
                issue.title,
                issue.description,
                issue.status_id,
                issue.priority_id,
                issue.assignee_id,
                issue.updated_at_ms
            ],
        )?;
        tx.commit()?;
        Ok(issue)
    }

    /// Comments and tag associations go with the issue; nothing else does.
    pub fn delete_issue(&mut self, id: IssueId) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let deleted = tx.execute("DELETE FROM issues WHERE id=?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::not_found(EntityKind::Issue, id));
        }
        tx.commit()?;
        Ok(())
    }

    pub fn issue_count(&self) -> Result<u64, StoreError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM issues", [], |row| row.get::<_, i64>(0))?;
        Ok(count.max(0) as u64)
    }
}

pub(super) fn issue_by_id(conn: &Connection, id: IssueId) -> Result<Option<Issue>, StoreError> {
    let row = conn
        .query_row(
            "SELECT id, title, description, status_id, priority_id, author_id, assignee_id, created_at_ms, updated_at_ms \
             FROM issues WHERE id=?1",
            params![id],
            |row| {
                Ok(Issue {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    description: row.get(2)?,
                    status_id: row.get(3)?,
                    priority_id: row.get(4)?,
                    author_id: row.get(5)?,
                    assignee_id: row.get(6)?,
                    tag_ids: Vec::new(),
                    created_at_ms: row.get(7)?,
                    updated_at_ms: row.get(8)?,
                })
            },
        )
        .optional()?;

    let Some(mut issue) = row else {
        return Ok(None);
    };
    issue.tag_ids = issue_tag_ids(conn, id)?;
    Ok(Some(issue))
}

fn issue_tag_ids(conn: &Connection, issue_id: IssueId) -> Result<Vec<TagId>, StoreError> {
    let mut stmt =
        conn.prepare("SELECT tag_id FROM issue_tags WHERE issue_id=?1 ORDER BY tag_id ASC")?;
    let rows = stmt.query_map(params![issue_id], |row| row.get::<_, i64>(0))?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn ensure_user_reference(conn: &Connection, id: UserId) -> Result<(), StoreError> {
    if user_exists(conn, id)? {
        Ok(())
    } else {
        Err(StoreError::invalid_reference(EntityKind::User, id))
    }
}

fn ensure_tag_references(conn: &Connection, tag_ids: &[TagId]) -> Result<(), StoreError> {
    for &tag_id in tag_ids {
        if super::tags::tag_by_id(conn, tag_id)?.is_none() {
            return Err(StoreError::invalid_reference(EntityKind::Tag, tag_id));
        }
    }
    Ok(())
}

fn replace_tags_tx(
    tx: &Transaction<'_>,
    issue_id: IssueId,
    tag_ids: &[TagId],
) -> Result<(), StoreError> {
    tx.execute("DELETE FROM issue_tags WHERE issue_id=?1", params![issue_id])?;
    let mut insert = tx.prepare("INSERT INTO issue_tags(issue_id, tag_id) VALUES (?1, ?2)")?;
    for tag_id in tag_ids {
        insert.execute(params![issue_id, tag_id])?;
    }
    Ok(())
}

fn dedup_tags(tag_ids: Vec<TagId>) -> Vec<TagId> {
    tag_ids
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
