#![forbid(unsafe_code)]

pub mod model;
pub mod policy;
pub mod query;
pub mod text;
pub mod timestamp;
pub mod view;

pub mod ids {
    pub type UserId = i64;
    pub type IssueId = i64;
    pub type CommentId = i64;
    pub type TagId = i64;
    pub type StatusId = i64;
    pub type PriorityId = i64;
}

pub use model::{Comment, EntityKind, Issue, Role, Tag, TaxonomyEntry, TaxonomyKind, User};
pub use policy::{Action, Actor, PolicyDenied};
pub use view::{
    CommentView, IssueSummary, IssueView, NamedRef, Page, ProfileView, TagRef, TaxonomyUsage,
};
