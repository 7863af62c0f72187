#![forbid(unsafe_code)]

//! Wire shapes. Field names here are the external contract; keep them stable.

use crate::ids::{CommentId, IssueId, TagId, UserId};
use crate::model::{Role, Tag, TaxonomyEntry, User};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NamedRef {
    pub id: i64,
    pub name: String,
}

impl From<&TaxonomyEntry> for NamedRef {
    fn from(entry: &TaxonomyEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagRef {
    pub id: TagId,
    pub name: String,
    pub color: Option<String>,
}

impl From<Tag> for TagRef {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            color: tag.color,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueView {
    pub id: IssueId,
    pub title: String,
    pub description: Option<String>,
    pub status: NamedRef,
    pub priority: NamedRef,
    pub author: NamedRef,
    pub assignee: Option<NamedRef>,
    pub tags: Vec<TagRef>,
    pub created_at: String,
    pub updated_at: String,
    pub comment_count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: CommentId,
    pub issue_id: IssueId,
    pub content: String,
    pub author: NamedRef,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProfileView {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for ProfileView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Minimal issue identity used when reporting referential conflicts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IssueSummary {
    pub id: IssueId,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyUsage {
    pub deletable: bool,
    pub referencing_issues: Vec<IssueSummary>,
}

impl TaxonomyUsage {
    pub fn from_references(referencing_issues: Vec<IssueSummary>) -> Self {
        Self {
            deletable: referencing_issues.is_empty(),
            referencing_issues,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total_count: u64,
    pub skip: u64,
    pub limit: u64,
    pub data: Vec<T>,
}
