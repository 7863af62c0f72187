#![forbid(unsafe_code)]

use tracker_core::ids::{IssueId, PriorityId, StatusId, TagId, UserId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password_digest: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub password_digest: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateIssueRequest {
    pub title: String,
    pub description: Option<String>,
    pub status_id: StatusId,
    pub priority_id: PriorityId,
    pub author_id: UserId,
    pub assignee_id: Option<UserId>,
    pub tag_ids: Vec<TagId>,
}

/// Field replacements for an issue. Outer `None` leaves a field untouched;
/// `Some(None)` clears a nullable field. `tag_ids` replaces the whole set.
/// The author is fixed at creation and has no patch field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IssuePatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status_id: Option<StatusId>,
    pub priority_id: Option<PriorityId>,
    pub assignee_id: Option<Option<UserId>>,
    pub tag_ids: Option<Vec<TagId>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateCommentRequest {
    pub issue_id: IssueId,
    pub author_id: UserId,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateTagRequest {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagPatch {
    pub name: Option<String>,
    pub color: Option<Option<String>>,
}
