#![allow(dead_code)]

use tracker_core::ids::{IssueId, TagId, UserId};
use tracker_core::model::{Comment, Issue, Tag, TaxonomyEntry, TaxonomyKind, User};
use tracker_storage::{
    CreateCommentRequest, CreateIssueRequest, CreateTagRequest, CreateUserRequest, SqliteStore,
};

pub struct Fixture {
    pub store: SqliteStore,
    pub alice: User,
    pub bob: User,
    pub open: TaxonomyEntry,
    pub closed: TaxonomyEntry,
    pub high: TaxonomyEntry,
    pub low: TaxonomyEntry,
    pub bug: Tag,
    pub ui: Tag,
}

pub fn fixture() -> Fixture {
    let mut store = SqliteStore::open_in_memory().expect("in-memory store should open");
    let alice = user(&mut store, "Alice", "alice@example.com");
    let bob = user(&mut store, "Bob", "bob@example.com");
    let open = store
        .create_taxonomy(TaxonomyKind::Status, "open")
        .expect("status should be created");
    let closed = store
        .create_taxonomy(TaxonomyKind::Status, "closed")
        .expect("status should be created");
    let high = store
        .create_taxonomy(TaxonomyKind::Priority, "high")
        .expect("priority should be created");
    let low = store
        .create_taxonomy(TaxonomyKind::Priority, "low")
        .expect("priority should be created");
    let bug = tag(&mut store, "bug", "red");
    let ui = tag(&mut store, "ui", "blue");

    Fixture {
        store,
        alice,
        bob,
        open,
        closed,
        high,
        low,
        bug,
        ui,
    }
}

pub fn user(store: &mut SqliteStore, name: &str, email: &str) -> User {
    store
        .create_user(CreateUserRequest {
            name: name.to_string(),
            email: email.to_string(),
            password_digest: "digest".to_string(),
        })
        .expect("user should be created")
}

pub fn tag(store: &mut SqliteStore, name: &str, color: &str) -> Tag {
    store
        .create_tag(CreateTagRequest {
            name: name.to_string(),
            color: Some(color.to_string()),
        })
        .expect("tag should be created")
}

impl Fixture {
    pub fn issue(
        &mut self,
        title: &str,
        author_id: UserId,
        status_id: i64,
        priority_id: i64,
        tag_ids: Vec<TagId>,
    ) -> Issue {
        self.store
            .create_issue(CreateIssueRequest {
                title: title.to_string(),
                description: Some(format!("{title} description")),
                status_id,
                priority_id,
                author_id,
                assignee_id: None,
                tag_ids,
            })
            .expect("issue should be created")
    }

    pub fn comment(&mut self, issue_id: IssueId, author_id: UserId, content: &str) -> Comment {
        self.store
            .create_comment(CreateCommentRequest {
                issue_id,
                author_id,
                content: content.to_string(),
            })
            .expect("comment should be created")
    }
}
