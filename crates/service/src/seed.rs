#![forbid(unsafe_code)]

//! Demo data for a fresh tracker.

use crate::credentials::CredentialService;
use crate::error::ServiceError;
use crate::tokens::TokenService;
use crate::tracker::IssueTracker;
use std::collections::BTreeMap;
use tracker_core::model::TaxonomyKind;
use tracker_storage::{
    CreateCommentRequest, CreateIssueRequest, CreateTagRequest, CreateUserRequest, SqliteStore,
};

const USERS: [(&str, &str); 3] = [
    ("Kemal", "kemal@example.com"),
    ("John Doe", "john@example.com"),
    ("Jane Smith", "jane@example.com"),
];

const TAGS: [(&str, &str); 5] = [
    ("ui", "blue"),
    ("bug", "red"),
    ("feature", "green"),
    ("enhancement", "yellow"),
    ("documentation", "purple"),
];

const STATUSES: [&str; 3] = ["open", "in_progress", "closed"];
const PRIORITIES: [&str; 3] = ["high", "medium", "low"];

struct DemoIssue {
    title: &'static str,
    description: &'static str,
    status: &'static str,
    priority: &'static str,
    author: &'static str,
    tags: &'static [&'static str],
    comments: &'static [(&'static str, &'static str)],
}

const ISSUES: [DemoIssue; 4] = [
    DemoIssue {
        title: "Fix login bug",
        description: "There is a login bug we need to fix.",
        status: "open",
        priority: "high",
        author: "kemal@example.com",
        tags: &["bug"],
        comments: &[
            ("john@example.com", "I noticed this happens only on mobile."),
            ("jane@example.com", "Working on this right now."),
        ],
    },
    DemoIssue {
        title: "Login page not responsive",
        description: "The login page is not responsive on mobile devices.",
        status: "open",
        priority: "high",
        author: "john@example.com",
        tags: &["bug", "enhancement"],
        comments: &[],
    },
    DemoIssue {
        title: "Add dark mode support",
        description: "Add dark mode support to the application.",
        status: "in_progress",
        priority: "medium",
        author: "jane@example.com",
        tags: &["feature", "ui"],
        comments: &[],
    },
    DemoIssue {
        title: "Fix typo in About page",
        description: "Fix the typo in the About page.",
        status: "closed",
        priority: "low",
        author: "john@example.com",
        tags: &["bug", "enhancement"],
        comments: &[],
    },
];

/// Counts of what a seeding run created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub issues: usize,
    pub comments: usize,
}

impl<C: CredentialService, T: TokenService> IssueTracker<C, T> {
    /// Populates users, taxonomy, tags, issues and comments. Does nothing when
    /// any issue already exists. Every demo account gets `password`; accounts,
    /// taxonomy entries and tags that already exist are reused as they are.
    pub fn seed_demo(&self, password: &str) -> Result<Option<SeedReport>, ServiceError> {
        let mut store = self.lock()?;
        if store.issue_count()? > 0 {
            tracing::info!("demo seed skipped: issues already exist");
            return Ok(None);
        }
        let digest = self.credentials().hash(password)?;

        let mut report = SeedReport::default();
        let mut users = BTreeMap::new();
        for (name, email) in USERS {
            let id = match store.find_user_by_email(email)? {
                Some(user) => user.id,
                None => {
                    report.users += 1;
                    store
                        .create_user(CreateUserRequest {
                            name: name.to_string(),
                            email: email.to_string(),
                            password_digest: digest.clone(),
                        })?
                        .id
                }
            };
            users.insert(email, id);
        }

        let statuses = ensure_taxonomy(&mut store, TaxonomyKind::Status, &STATUSES)?;
        let priorities = ensure_taxonomy(&mut store, TaxonomyKind::Priority, &PRIORITIES)?;

        let tags = ensure_tags(&mut store)?;

        for demo in &ISSUES {
            let issue = store.create_issue(CreateIssueRequest {
                title: demo.title.to_string(),
                description: Some(demo.description.to_string()),
                status_id: lookup(&statuses, demo.status)?,
                priority_id: lookup(&priorities, demo.priority)?,
                author_id: lookup(&users, demo.author)?,
                assignee_id: None,
                tag_ids: demo
                    .tags
                    .iter()
                    .map(|name| lookup(&tags, name))
                    .collect::<Result<Vec<_>, _>>()?,
            })?;
            report.issues += 1;

            for (author, content) in demo.comments {
                store.create_comment(CreateCommentRequest {
                    issue_id: issue.id,
                    author_id: lookup(&users, author)?,
                    content: content.to_string(),
                })?;
                report.comments += 1;
            }
        }

        tracing::info!(
            users = report.users,
            issues = report.issues,
            comments = report.comments,
            "demo data seeded"
        );
        Ok(Some(report))
    }
}

fn ensure_taxonomy(
    store: &mut SqliteStore,
    kind: TaxonomyKind,
    names: &[&'static str],
) -> Result<BTreeMap<&'static str, i64>, ServiceError> {
    let mut ids = BTreeMap::new();
    for &name in names {
        let id = match store.find_taxonomy_by_name(kind, name)? {
            Some(entry) => entry.id,
            None => store.create_taxonomy(kind, name)?.id,
        };
        ids.insert(name, id);
    }
    Ok(ids)
}

/// Tag names are not unique, so the first tag with a demo name is reused.
fn ensure_tags(store: &mut SqliteStore) -> Result<BTreeMap<&'static str, i64>, ServiceError> {
    let existing = store.list_tags()?;
    let mut ids = BTreeMap::new();
    for (name, color) in TAGS {
        let id = match existing.iter().find(|tag| tag.name == name) {
            Some(tag) => tag.id,
            None => {
                store
                    .create_tag(CreateTagRequest {
                        name: name.to_string(),
                        color: Some(color.to_string()),
                    })?
                    .id
            }
        };
        ids.insert(name, id);
    }
    Ok(ids)
}

fn lookup(ids: &BTreeMap<&'static str, i64>, key: &str) -> Result<i64, ServiceError> {
    ids.get(key)
        .copied()
        .ok_or_else(|| ServiceError::internal(format!("demo data references unknown key {key}")))
}
