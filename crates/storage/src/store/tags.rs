#![forbid(unsafe_code)]

use super::*;
use rusqlite::{OptionalExtension, Row, params};
use tracker_core::ids::TagId;
use tracker_core::model::{EntityKind, Tag};
use tracker_core::text::{self, MAX_TAG_COLOR, MAX_TAG_NAME};

impl SqliteStore {
    pub fn create_tag(&mut self, request: CreateTagRequest) -> Result<Tag, StoreError> {
        let name = text::required_line("name", &request.name, MAX_TAG_NAME)?;
        let color = normalize_color(request.color.as_deref())?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO tags(name, color) VALUES (?1, ?2)",
            params![name, color],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Tag { id, name, color })
    }

    pub fn list_tags(&self) -> Result<Vec<Tag>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color FROM tags ORDER BY id ASC")?;
        let rows = stmt.query_map([], tag_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get_tag(&self, id: TagId) -> Result<Option<Tag>, StoreError> {
        tag_by_id(&self.conn, id)
    }

    pub fn update_tag(&mut self, id: TagId, patch: TagPatch) -> Result<Tag, StoreError> {
        let name = patch
            .name
            .as_deref()
            .map(|value| text::required_line("name", value, MAX_TAG_NAME))
            .transpose()?;
        let color = patch
            .color
            .as_ref()
            .map(|value| normalize_color(value.as_deref()))
            .transpose()?;

        let tx = self.conn.transaction()?;
        let mut tag = tag_by_id(&tx, id)?.ok_or(StoreError::not_found(EntityKind::Tag, id))?;
        if let Some(name) = name {
            tag.name = name;
        }
        if let Some(color) = color {
            tag.color = color;
        }
        tx.execute(
            "UPDATE tags SET name=?2, color=?3 WHERE id=?1",
            params![id, tag.name, tag.color],
        )?;
        tx.commit()?;
        Ok(tag)
    }

    /// Unconditional: issue associations go with the tag.
    pub fn delete_tag(&mut self, id: TagId) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let deleted = tx.execute("DELETE FROM tags WHERE id=?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::not_found(EntityKind::Tag, id));
        }
        tx.commit()?;
        Ok(())
    }
}

pub(super) fn tag_by_id(conn: &Connection, id: TagId) -> Result<Option<Tag>, StoreError> {
    Ok(conn
        .query_row(
            "SELECT id, name, color FROM tags WHERE id=?1",
            params![id],
            tag_from_row,
        )
        .optional()?)
}

pub(super) fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
    })
}

fn normalize_color(value: Option<&str>) -> Result<Option<String>, StoreError> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(color) => Ok(Some(text::required_line("color", color, MAX_TAG_COLOR)?)),
        None => Ok(None),
    }
}
