#![forbid(unsafe_code)]

use super::issues::issue_by_id;
use super::users::user_exists;
use super::*;
use rusqlite::{OptionalExtension, params};
use tracker_core::ids::CommentId;
use tracker_core::model::{Comment, EntityKind};
use tracker_core::text::{self, MAX_BODY};

impl SqliteStore {
    pub fn create_comment(&mut self, request: CreateCommentRequest) -> Result<Comment, StoreError> {
        let content = text::required_text("content", &request.content, MAX_BODY)?;

        let tx = self.conn.transaction()?;
        if issue_by_id(&tx, request.issue_id)?.is_none() {
            return Err(StoreError::not_found(EntityKind::Issue, request.issue_id));
        }
        if !user_exists(&tx, request.author_id)? {
            return Err(StoreError::invalid_reference(
                EntityKind::User,
                request.author_id,
            ));
        }

        let now_ms = now_ms();
        tx.execute(
            "INSERT INTO comments(issue_id, author_id, content, created_at_ms, updated_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![request.issue_id, request.author_id, content, now_ms],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Comment {
            id,
            issue_id: request.issue_id,
            author_id: request.author_id,
            content,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        })
    }

    pub fn get_comment(&self, id: CommentId) -> Result<Option<Comment>, StoreError> {
        comment_by_id(&self.conn, id)
    }

    pub fn update_comment(&mut self, id: CommentId, content: &str) -> Result<Comment, StoreError> {
        let content = text::required_text("content", content, MAX_BODY)?;

        let tx = self.conn.transaction()?;
        let mut comment =
            comment_by_id(&tx, id)?.ok_or(StoreError::not_found(EntityKind::Comment, id))?;
        comment.content = content;
        comment.updated_at_ms = touched_at(comment.updated_at_ms);
        tx.execute(
            "UPDATE comments SET content=?2, updated_at_ms=?3 WHERE id=?1",
            params![id, comment.content, comment.updated_at_ms],
        )?;
        tx.commit()?;
        Ok(comment)
    }

    pub fn delete_comment(&mut self, id: CommentId) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let deleted = tx.execute("DELETE FROM comments WHERE id=?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::not_found(EntityKind::Comment, id));
        }
        tx.commit()?;
        Ok(())
    }
}

fn comment_by_id(conn: &Connection, id: CommentId) -> Result<Option<Comment>, StoreError> {
    Ok(conn
        .query_row(
            "SELECT id, issue_id, author_id, content, created_at_ms, updated_at_ms \
             FROM comments WHERE id=?1",
            params![id],
            |row| {
                Ok(Comment {
                    id: row.get(0)?,
                    issue_id: row.get(1)?,
                    author_id: row.get(2)?,
                    content: row.get(3)?,
                    created_at_ms: row.get(4)?,
                    updated_at_ms: row.get(5)?,
                })
            },
        )
        .optional()?)
}
