#![forbid(unsafe_code)]

//! Filtered, paginated reads. Results are ordered by `updated_at` descending
//! with ties broken by id descending, so consecutive windows never overlap.

use super::tags::tag_from_row;
use super::*;
use rusqlite::types::Value;
use rusqlite::{OptionalExtension, Row, params, params_from_iter};
use tracker_core::ids::{CommentId, IssueId};
use tracker_core::query::{CommentFilter, CommentQuery, IssueFilter, IssueQuery};
use tracker_core::timestamp::ts_ms_to_rfc3339;
use tracker_core::view::{CommentView, IssueView, NamedRef, Page, TagRef};

const ISSUE_VIEW_SELECT: &str = "\
    SELECT i.id, i.title, i.description, \
           s.id, s.name, p.id, p.name, a.id, a.name, u.id, u.name, \
           i.created_at_ms, i.updated_at_ms, \
           (SELECT COUNT(*) FROM comments c WHERE c.issue_id = i.id) \
    FROM issues i \
    JOIN statuses s ON s.id = i.status_id \
    JOIN priorities p ON p.id = i.priority_id \
    JOIN users a ON a.id = i.author_id \
    LEFT JOIN users u ON u.id = i.assignee_id";

const COMMENT_VIEW_SELECT: &str = "\
    SELECT c.id, c.issue_id, c.content, a.id, a.name, c.created_at_ms, c.updated_at_ms \
    FROM comments c \
    JOIN users a ON a.id = c.author_id";

/// WHERE clause assembled from optional filters, with positional values.
#[derive(Default)]
struct Conditions {
    clauses: Vec<String>,
    values: Vec<Value>,
}

impl Conditions {
    fn push(&mut self, clause: &str, value: impl Into<Value>) {
        self.values.push(value.into());
        self.clauses
            .push(clause.replace('?', &format!("?{}", self.values.len())));
    }

    fn push_any_of(&mut self, template: &str, values: impl IntoIterator<Item = i64>) {
        let mut placeholders = Vec::new();
        for value in values {
            self.values.push(Value::Integer(value));
            placeholders.push(format!("?{}", self.values.len()));
        }
        if placeholders.is_empty() {
            return;
        }
        self.clauses
            .push(template.replace("{}", &placeholders.join(", ")));
    }

    fn sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    fn next_index(&self) -> usize {
        self.values.len() + 1
    }
}

impl SqliteStore {
    pub fn list_issues(&self, query: &IssueQuery) -> Result<Page<IssueView>, StoreError> {
        let conditions = issue_conditions(&query.filter);
        let where_sql = conditions.sql();

        let total_count = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM issues i{where_sql}"),
            params_from_iter(conditions.values.iter()),
            |row| row.get::<_, i64>(0),
        )?;

        let limit_index = conditions.next_index();
        let sql = format!(
            "{ISSUE_VIEW_SELECT}{where_sql} \
             ORDER BY i.updated_at_ms DESC, i.id DESC \
             LIMIT ?{limit_index} OFFSET ?{}",
            limit_index + 1
        );
        let mut values = conditions.values;
        values.push(Value::Integer(to_sqlite_i64(query.page.limit)));
        values.push(Value::Integer(to_sqlite_i64(query.page.skip)));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), issue_view_from_row)?;
        let mut data = rows.collect::<Result<Vec<_>, _>>()?;
        for view in &mut data {
            view.tags = issue_tags(&self.conn, view.id)?;
        }

        Ok(Page {
            total_count: total_count.max(0) as u64,
            skip: query.page.skip,
            limit: query.page.limit,
            data,
        })
    }

    pub fn issue_view(&self, id: IssueId) -> Result<Option<IssueView>, StoreError> {
        let view = self
            .conn
            .query_row(
                &format!("{ISSUE_VIEW_SELECT} WHERE i.id=?1"),
                params![id],
                issue_view_from_row,
            )
            .optional()?;
        let Some(mut view) = view else {
            return Ok(None);
        };
        view.tags = issue_tags(&self.conn, id)?;
        Ok(Some(view))
    }

    pub fn list_comments(&self, query: &CommentQuery) -> Result<Page<CommentView>, StoreError> {
        let conditions = comment_conditions(&query.filter);
        let where_sql = conditions.sql();

        let total_count = self.conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM comments c JOIN users a ON a.id = c.author_id{where_sql}"
            ),
            params_from_iter(conditions.values.iter()),
            |row| row.get::<_, i64>(0),
        )?;

        let limit_index = conditions.next_index();
        let sql = format!(
            "{COMMENT_VIEW_SELECT}{where_sql} \
             ORDER BY c.updated_at_ms DESC, c.id DESC \
             LIMIT ?{limit_index} OFFSET ?{}",
            limit_index + 1
        );
        let mut values = conditions.values;
        values.push(Value::Integer(to_sqlite_i64(query.page.limit)));
        values.push(Value::Integer(to_sqlite_i64(query.page.skip)));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), comment_view_from_row)?;
        let data = rows.collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            total_count: total_count.max(0) as u64,
            skip: query.page.skip,
            limit: query.page.limit,
            data,
        })
    }

    pub fn comment_view(&self, id: CommentId) -> Result<Option<CommentView>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!("{COMMENT_VIEW_SELECT} WHERE c.id=?1"),
                params![id],
                comment_view_from_row,
            )
            .optional()?)
    }
}

fn issue_conditions(filter: &IssueFilter) -> Conditions {
    let mut conditions = Conditions::default();
    if let Some(status_id) = filter.status_id {
        conditions.push("i.status_id = ?", status_id);
    }
    if let Some(priority_id) = filter.priority_id {
        conditions.push("i.priority_id = ?", priority_id);
    }
    if let Some(author_id) = filter.author_id {
        conditions.push("i.author_id = ?", author_id);
    }
    if let Some(assignee_id) = filter.assignee_id {
        conditions.push("i.assignee_id = ?", assignee_id);
    }
    conditions.push_any_of(
        "EXISTS (SELECT 1 FROM issue_tags it WHERE it.issue_id = i.id AND it.tag_id IN ({}))",
        filter.tag_ids.iter().copied(),
    );
    if let Some(after) = filter.created_after_ms {
        conditions.push("i.created_at_ms >= ?", after);
    }
    if let Some(before) = filter.created_before_ms {
        conditions.push("i.created_at_ms <= ?", before);
    }
    conditions
}

fn comment_conditions(filter: &CommentFilter) -> Conditions {
    let mut conditions = Conditions::default();
    if let Some(issue_id) = filter.issue_id {
        conditions.push("c.issue_id = ?", issue_id);
    }
    if let Some(author_id) = filter.author_id {
        conditions.push("c.author_id = ?", author_id);
    }
    if let Some(name) = &filter.author_name {
        // SQLite lower() folds ASCII only; the needle is folded the same way.
        conditions.push("instr(lower(a.name), ?) > 0", name.to_ascii_lowercase());
    }
    if let Some(after) = filter.created_after_ms {
        conditions.push("c.created_at_ms >= ?", after);
    }
    if let Some(before) = filter.created_before_ms {
        conditions.push("c.created_at_ms <= ?", before);
    }
    conditions
}

fn issue_view_from_row(row: &Row<'_>) -> rusqlite::Result<IssueView> {
    let assignee = match (row.get::<_, Option<i64>>(9)?, row.get::<_, Option<String>>(10)?) {
        (Some(id), Some(name)) => Some(NamedRef { id, name }),
        _ => None,
    };
    Ok(IssueView {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: NamedRef {
            id: row.get(3)?,
            name: row.get(4)?,
        },
        priority: NamedRef {
            id: row.get(5)?,
            name: row.get(6)?,
        },
        author: NamedRef {
            id: row.get(7)?,
            name: row.get(8)?,
        },
        assignee,
        tags: Vec::new(),
        created_at: ts_ms_to_rfc3339(row.get(11)?),
        updated_at: ts_ms_to_rfc3339(row.get(12)?),
        comment_count: row.get::<_, i64>(13)?.max(0) as u64,
    })
}

fn comment_view_from_row(row: &Row<'_>) -> rusqlite::Result<CommentView> {
    Ok(CommentView {
        id: row.get(0)?,
        issue_id: row.get(1)?,
        content: row.get(2)?,
        author: NamedRef {
            id: row.get(3)?,
            name: row.get(4)?,
        },
        created_at: ts_ms_to_rfc3339(row.get(5)?),
        updated_at: ts_ms_to_rfc3339(row.get(6)?),
    })
}

fn issue_tags(conn: &Connection, issue_id: IssueId) -> Result<Vec<TagRef>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name, t.color FROM issue_tags it \
         JOIN tags t ON t.id = it.tag_id \
         WHERE it.issue_id=?1 ORDER BY t.id ASC",
    )?;
    let rows = stmt.query_map(params![issue_id], tag_from_row)?;
    Ok(rows
        .map(|row| row.map(TagRef::from))
        .collect::<Result<Vec<_>, _>>()?)
}
