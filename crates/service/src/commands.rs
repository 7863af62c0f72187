#![forbid(unsafe_code)]

//! One command per mutating operation. Each is decoded from a JSON body
//! without judging its values; `validate` runs once the actor is known and
//! authorized, and yields the request the store executes.
//!
//! Fields the caller may never set (an issue's author, a user's email or role)
//! have no slot here, so they are ignored when present in a body.

use crate::args::{
    Args, optional_i64, optional_i64_array, optional_nullable_i64, optional_nullable_string,
    optional_string,
};
use tracker_core::ids::{IssueId, PriorityId, StatusId, TagId, UserId};
use tracker_core::text::{
    self, FieldError, MAX_BODY, MAX_TAG_COLOR, MAX_TAG_NAME, MAX_TAXONOMY_NAME, MAX_TITLE,
    MAX_USER_NAME,
};
use tracker_storage::{CreateCommentRequest, CreateIssueRequest, CreateTagRequest, IssuePatch, TagPatch};

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, FieldError> {
    value.ok_or(FieldError::Missing { field })
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Registration values after validation; the password is still plaintext.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterUser {
    pub fn new(name: &str, email: &str, password: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    pub fn from_json(args: &Args) -> Result<Self, FieldError> {
        Ok(Self {
            name: optional_string(args, "name")?,
            email: optional_string(args, "email")?,
            password: optional_string(args, "password")?,
        })
    }

    pub(crate) fn validate(self) -> Result<Registration, FieldError> {
        let name = text::required_line("name", &required(self.name, "name")?, MAX_USER_NAME)?;
        let email = text::email(&required(self.email, "email")?)?;
        let password = required(self.password, "password")?;
        text::password(&password)?;
        Ok(Registration {
            name,
            email,
            password,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Login {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Login {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    pub fn from_json(args: &Args) -> Result<Self, FieldError> {
        Ok(Self {
            email: optional_string(args, "email")?,
            password: optional_string(args, "password")?,
        })
    }

    pub(crate) fn validate(self) -> Result<(String, String), FieldError> {
        let email = text::required_line("email", &required(self.email, "email")?, text::MAX_EMAIL)?;
        let password = required(self.password, "password")?;
        text::password(&password)?;
        Ok((email, password))
    }
}

/// Profile changes a user may make to themselves.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub password: Option<String>,
}

impl UpdateProfile {
    pub fn from_json(args: &Args) -> Result<Self, FieldError> {
        Ok(Self {
            name: optional_string(args, "name")?,
            password: optional_string(args, "password")?,
        })
    }

    pub(crate) fn validate(self) -> Result<Self, FieldError> {
        let name = self
            .name
            .as_deref()
            .map(|value| text::required_line("name", value, MAX_USER_NAME))
            .transpose()?;
        if let Some(password) = self.password.as_deref() {
            text::password(password)?;
        }
        Ok(Self {
            name,
            password: self.password,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreateIssue {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status_id: Option<StatusId>,
    pub priority_id: Option<PriorityId>,
    pub assignee_id: Option<UserId>,
    pub tag_ids: Vec<TagId>,
}

impl CreateIssue {
    pub fn new(title: &str, status_id: StatusId, priority_id: PriorityId) -> Self {
        Self {
            title: Some(title.to_string()),
            status_id: Some(status_id),
            priority_id: Some(priority_id),
            ..Self::default()
        }
    }

    pub fn from_json(args: &Args) -> Result<Self, FieldError> {
        Ok(Self {
            title: optional_string(args, "title")?,
            description: optional_string(args, "description")?,
            status_id: optional_i64(args, "statusId")?,
            priority_id: optional_i64(args, "priorityId")?,
            assignee_id: optional_i64(args, "assigneeId")?,
            tag_ids: optional_i64_array(args, "tagIds")?.unwrap_or_default(),
        })
    }

    pub(crate) fn validate(self, author_id: UserId) -> Result<CreateIssueRequest, FieldError> {
        let title = text::required_line("title", &required(self.title, "title")?, MAX_TITLE)?;
        let description = text::optional_text("description", self.description.as_deref(), MAX_BODY)?;
        Ok(CreateIssueRequest {
            title,
            description,
            status_id: required(self.status_id, "statusId")?,
            priority_id: required(self.priority_id, "priorityId")?,
            author_id,
            assignee_id: self.assignee_id,
            tag_ids: self.tag_ids,
        })
    }
}

/// Absent fields are left unchanged; `Some(None)` clears a nullable field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateIssue {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status_id: Option<StatusId>,
    pub priority_id: Option<PriorityId>,
    pub assignee_id: Option<Option<UserId>>,
    pub tag_ids: Option<Vec<TagId>>,
}

impl UpdateIssue {
    pub fn from_json(args: &Args) -> Result<Self, FieldError> {
        Ok(Self {
            title: optional_string(args, "title")?,
            description: optional_nullable_string(args, "description")?,
            status_id: optional_i64(args, "statusId")?,
            priority_id: optional_i64(args, "priorityId")?,
            assignee_id: optional_nullable_i64(args, "assigneeId")?,
            tag_ids: optional_i64_array(args, "tagIds")?,
        })
    }

    pub(crate) fn validate(self) -> Result<IssuePatch, FieldError> {
        let title = self
            .title
            .as_deref()
            .map(|value| text::required_line("title", value, MAX_TITLE))
            .transpose()?;
        let description = self
            .description
            .map(|value| text::optional_text("description", value.as_deref(), MAX_BODY))
            .transpose()?;
        Ok(IssuePatch {
            title,
            description,
            status_id: self.status_id,
            priority_id: self.priority_id,
            assignee_id: self.assignee_id,
            tag_ids: self.tag_ids,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreateComment {
    pub issue_id: Option<IssueId>,
    pub content: Option<String>,
}

impl CreateComment {
    pub fn new(issue_id: IssueId, content: &str) -> Self {
        Self {
            issue_id: Some(issue_id),
            content: Some(content.to_string()),
        }
    }

    pub fn from_json(args: &Args) -> Result<Self, FieldError> {
        Ok(Self {
            issue_id: optional_i64(args, "issueId")?,
            content: optional_string(args, "content")?,
        })
    }

    /// The target issue, resolved before the payload is validated.
    pub(crate) fn issue_id(&self) -> Result<IssueId, FieldError> {
        required(self.issue_id, "issueId")
    }

    pub(crate) fn validate(self, author_id: UserId) -> Result<CreateCommentRequest, FieldError> {
        let issue_id = self.issue_id()?;
        let content = text::required_text("content", &required(self.content, "content")?, MAX_BODY)?;
        Ok(CreateCommentRequest {
            issue_id,
            author_id,
            content,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateComment {
    pub content: Option<String>,
}

impl UpdateComment {
    pub fn new(content: &str) -> Self {
        Self {
            content: Some(content.to_string()),
        }
    }

    pub fn from_json(args: &Args) -> Result<Self, FieldError> {
        Ok(Self {
            content: optional_string(args, "content")?,
        })
    }

    pub(crate) fn validate(self) -> Result<String, FieldError> {
        text::required_text("content", &required(self.content, "content")?, MAX_BODY)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreateTag {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl CreateTag {
    pub fn new(name: &str, color: Option<&str>) -> Self {
        Self {
            name: Some(name.to_string()),
            color: color.map(str::to_string),
        }
    }

    pub fn from_json(args: &Args) -> Result<Self, FieldError> {
        Ok(Self {
            name: optional_string(args, "name")?,
            color: optional_string(args, "color")?,
        })
    }

    pub(crate) fn validate(self) -> Result<CreateTagRequest, FieldError> {
        let name = text::required_line("name", &required(self.name, "name")?, MAX_TAG_NAME)?;
        let color = self
            .color
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| text::required_line("color", value, MAX_TAG_COLOR))
            .transpose()?;
        Ok(CreateTagRequest { name, color })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateTag {
    pub name: Option<String>,
    pub color: Option<Option<String>>,
}

impl UpdateTag {
    pub fn from_json(args: &Args) -> Result<Self, FieldError> {
        Ok(Self {
            name: optional_string(args, "name")?,
            color: optional_nullable_string(args, "color")?,
        })
    }

    pub(crate) fn validate(self) -> Result<TagPatch, FieldError> {
        let name = self
            .name
            .as_deref()
            .map(|value| text::required_line("name", value, MAX_TAG_NAME))
            .transpose()?;
        let color = self
            .color
            .map(|value| text::optional_text("color", value.as_deref(), MAX_TAG_COLOR))
            .transpose()?;
        Ok(TagPatch { name, color })
    }
}

/// Name for a new or renamed status or priority.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaxonomyName {
    pub name: Option<String>,
}

impl TaxonomyName {
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
        }
    }

    pub fn from_json(args: &Args) -> Result<Self, FieldError> {
        Ok(Self {
            name: optional_string(args, "name")?,
        })
    }

    pub(crate) fn validate(self) -> Result<String, FieldError> {
        text::required_line("name", &required(self.name, "name")?, MAX_TAXONOMY_NAME)
    }
}
