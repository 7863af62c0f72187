#![forbid(unsafe_code)]

use crate::ids::{CommentId, IssueId, PriorityId, StatusId, TagId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_digest: String,
    pub role: Role,
}

/// Canonical issue row. Foreign keys are raw ids; see [`crate::view::IssueView`]
/// for the enriched shape handed to callers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Issue {
    pub id: IssueId,
    pub title: String,
    pub description: Option<String>,
    pub status_id: StatusId,
    pub priority_id: PriorityId,
    pub author_id: UserId,
    pub assignee_id: Option<UserId>,
    pub tag_ids: Vec<TagId>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub issue_id: IssueId,
    pub author_id: UserId,
    pub content: String,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub color: Option<String>,
}

/// Statuses and priorities share one shape and one set of rules; the kind
/// selects the backing table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaxonomyKind {
    Status,
    Priority,
}

impl TaxonomyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TaxonomyKind::Status => "status",
            TaxonomyKind::Priority => "priority",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            TaxonomyKind::Status => "statuses",
            TaxonomyKind::Priority => "priorities",
        }
    }

    /// Column on `issues` that references this kind.
    pub fn issue_column(self) -> &'static str {
        match self {
            TaxonomyKind::Status => "status_id",
            TaxonomyKind::Priority => "priority_id",
        }
    }
}

impl std::fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names an entity type in errors ("issue 4 not found", "unknown tag id 9").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Issue,
    Comment,
    Tag,
    Status,
    Priority,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Issue => "issue",
            EntityKind::Comment => "comment",
            EntityKind::Tag => "tag",
            EntityKind::Status => "status",
            EntityKind::Priority => "priority",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TaxonomyKind> for EntityKind {
    fn from(kind: TaxonomyKind) -> Self {
        match kind {
            TaxonomyKind::Status => EntityKind::Status,
            TaxonomyKind::Priority => EntityKind::Priority,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaxonomyEntry {
    pub kind: TaxonomyKind,
    pub id: i64,
    pub name: String,
}
