mod support;

use support::fixture;
use tracker_core::model::{EntityKind, Role};
use tracker_core::query::IssueQuery;
use tracker_core::text::FieldError;
use tracker_storage::{
    CreateIssueRequest, CreateUserRequest, IssuePatch, StoreError, TagPatch, UpdateUserRequest,
};

#[test]
fn duplicate_email_is_rejected_before_any_write() {
    let mut fx = fixture();
    let err = fx
        .store
        .create_user(CreateUserRequest {
            name: "Alice Again".to_string(),
            email: "alice@example.com".to_string(),
            password_digest: "digest".to_string(),
        })
        .expect_err("duplicate email must be rejected");
    assert!(matches!(err, StoreError::DuplicateEmail));
    assert_eq!(err.code(), "DUPLICATE_EMAIL");
    assert_eq!(fx.store.list_users().expect("users should list").len(), 2);
}

#[test]
fn user_fields_must_be_non_empty() {
    let mut fx = fixture();
    let err = fx
        .store
        .create_user(CreateUserRequest {
            name: "  ".to_string(),
            email: "x@example.com".to_string(),
            password_digest: "digest".to_string(),
        })
        .expect_err("blank name must be rejected");
    assert!(matches!(
        err,
        StoreError::Validation(FieldError::Empty { field: "name" })
    ));
}

#[test]
fn new_users_are_plain_users_and_can_be_promoted() {
    let mut fx = fixture();
    assert_eq!(fx.alice.role, Role::User);

    let promoted = fx
        .store
        .set_user_role(fx.alice.id, Role::Admin)
        .expect("role change should succeed");
    assert_eq!(promoted.role, Role::Admin);

    let reloaded = fx
        .store
        .get_user(fx.alice.id)
        .expect("lookup should succeed")
        .expect("user should exist");
    assert_eq!(reloaded.role, Role::Admin);
}

#[test]
fn update_user_keeps_email() {
    let mut fx = fixture();
    let updated = fx
        .store
        .update_user(
            fx.bob.id,
            UpdateUserRequest {
                name: Some("Robert".to_string()),
                password_digest: None,
            },
        )
        .expect("profile update should succeed");
    assert_eq!(updated.name, "Robert");
    assert_eq!(updated.email, "bob@example.com");
    assert_eq!(updated.password_digest, "digest");
}

#[test]
fn create_issue_checks_references() {
    let mut fx = fixture();
    let err = fx
        .store
        .create_issue(CreateIssueRequest {
            title: "Bug".to_string(),
            description: None,
            status_id: 999,
            priority_id: fx.high.id,
            author_id: fx.alice.id,
            assignee_id: None,
            tag_ids: Vec::new(),
        })
        .expect_err("unknown status must be rejected");
    assert!(matches!(
        err,
        StoreError::InvalidReference {
            kind: EntityKind::Status,
            id: 999
        }
    ));

    let err = fx
        .store
        .create_issue(CreateIssueRequest {
            title: "Bug".to_string(),
            description: None,
            status_id: fx.open.id,
            priority_id: fx.high.id,
            author_id: fx.alice.id,
            assignee_id: None,
            tag_ids: vec![fx.bug.id, 404],
        })
        .expect_err("unknown tag must be rejected");
    assert!(matches!(
        err,
        StoreError::InvalidReference {
            kind: EntityKind::Tag,
            id: 404
        }
    ));
    assert_eq!(fx.store.issue_count().expect("count should succeed"), 0);
}

#[test]
fn create_issue_validates_title_before_references() {
    let mut fx = fixture();
    let err = fx
        .store
        .create_issue(CreateIssueRequest {
            title: String::new(),
            description: None,
            status_id: 999,
            priority_id: 999,
            author_id: fx.alice.id,
            assignee_id: None,
            tag_ids: Vec::new(),
        })
        .expect_err("empty title must be rejected");
    assert_eq!(err.code(), "VALIDATION_ERROR");
}

#[test]
fn create_issue_defaults_and_dedups_tags() {
    let mut fx = fixture();
    let (alice, open, high, bug) = (fx.alice.id, fx.open.id, fx.high.id, fx.bug.id);
    let issue = fx.issue("Bug", alice, open, high, vec![bug, bug]);
    assert_eq!(issue.author_id, alice);
    assert_eq!(issue.assignee_id, None);
    assert_eq!(issue.tag_ids, vec![bug]);
    assert_eq!(issue.created_at_ms, issue.updated_at_ms);
}

#[test]
fn failed_update_leaves_issue_untouched() {
    let mut fx = fixture();
    let (alice, open, closed, high, bug, ui) = (
        fx.alice.id,
        fx.open.id,
        fx.closed.id,
        fx.high.id,
        fx.bug.id,
        fx.ui.id,
    );
    let issue = fx.issue("Bug", alice, open, high, vec![bug]);

    let err = fx
        .store
        .update_issue(
            issue.id,
            IssuePatch {
                title: Some("Renamed".to_string()),
                status_id: Some(closed),
                tag_ids: Some(vec![ui]),
                priority_id: Some(2_000),
                ..IssuePatch::default()
            },
        )
        .expect_err("unknown priority must be rejected");
    assert_eq!(err.code(), "INVALID_REFERENCE");

    let reloaded = fx
        .store
        .get_issue(issue.id)
        .expect("lookup should succeed")
        .expect("issue should exist");
    assert_eq!(reloaded, issue);
}

#[test]
fn update_replaces_tags_and_refreshes_updated_at() {
    let mut fx = fixture();
    let (alice, bob, open, closed, high, bug, ui) = (
        fx.alice.id,
        fx.bob.id,
        fx.open.id,
        fx.closed.id,
        fx.high.id,
        fx.bug.id,
        fx.ui.id,
    );
    let issue = fx.issue("Bug", alice, open, high, vec![bug]);
    std::thread::sleep(std::time::Duration::from_millis(2));

    let updated = fx
        .store
        .update_issue(
            issue.id,
            IssuePatch {
                status_id: Some(closed),
                assignee_id: Some(Some(bob)),
                description: Some(None),
                tag_ids: Some(vec![ui]),
                ..IssuePatch::default()
            },
        )
        .expect("update should succeed");

    assert_eq!(updated.status_id, closed);
    assert_eq!(updated.assignee_id, Some(bob));
    assert_eq!(updated.description, None);
    assert_eq!(updated.tag_ids, vec![ui]);
    assert_eq!(updated.author_id, alice);
    assert_eq!(updated.created_at_ms, issue.created_at_ms);
    assert!(updated.updated_at_ms > issue.updated_at_ms);
}

#[test]
fn empty_patch_still_touches_updated_at() {
    let mut fx = fixture();
    let (alice, open, high) = (fx.alice.id, fx.open.id, fx.high.id);
    let issue = fx.issue("Bug", alice, open, high, Vec::new());
    let updated = fx
        .store
        .update_issue(issue.id, IssuePatch::default())
        .expect("empty patch should succeed");
    assert!(updated.updated_at_ms >= issue.updated_at_ms);
    assert!(updated.updated_at_ms >= updated.created_at_ms);
}

#[test]
fn update_missing_issue_is_not_found() {
    let mut fx = fixture();
    let err = fx
        .store
        .update_issue(77, IssuePatch::default())
        .expect_err("missing issue must fail");
    assert!(matches!(
        err,
        StoreError::NotFound {
            kind: EntityKind::Issue,
            id: 77
        }
    ));
}

#[test]
fn deleting_an_issue_cascades_only_to_its_comments_and_tags() {
    let mut fx = fixture();
    let (alice, bob, open, high, bug) = (fx.alice.id, fx.bob.id, fx.open.id, fx.high.id, fx.bug.id);
    let doomed = fx.issue("Doomed", alice, open, high, vec![bug]);
    let survivor = fx.issue("Survivor", alice, open, high, vec![bug]);
    let doomed_comment = fx.comment(doomed.id, bob, "first");
    let survivor_comment = fx.comment(survivor.id, bob, "second");

    fx.store
        .delete_issue(doomed.id)
        .expect("delete should succeed");

    assert!(fx.store.get_issue(doomed.id).expect("lookup").is_none());
    assert!(
        fx.store
            .get_comment(doomed_comment.id)
            .expect("lookup")
            .is_none()
    );
    assert!(
        fx.store
            .get_comment(survivor_comment.id)
            .expect("lookup")
            .is_some()
    );
    let survivor = fx
        .store
        .get_issue(survivor.id)
        .expect("lookup")
        .expect("survivor should remain");
    assert_eq!(survivor.tag_ids, vec![bug]);
    assert!(fx.store.get_tag(bug).expect("lookup").is_some());
    assert!(fx.store.get_user(alice).expect("lookup").is_some());
    assert_eq!(fx.store.list_users().expect("users").len(), 2);

    let err = fx
        .store
        .delete_issue(doomed.id)
        .expect_err("second delete must fail");
    assert_eq!(err.code(), "NOT_FOUND");
}

#[test]
fn deleting_a_tag_removes_its_associations() {
    let mut fx = fixture();
    let (alice, open, high, bug, ui) = (fx.alice.id, fx.open.id, fx.high.id, fx.bug.id, fx.ui.id);
    let issue = fx.issue("Bug", alice, open, high, vec![bug, ui]);

    fx.store.delete_tag(bug).expect("tag delete should succeed");

    let reloaded = fx
        .store
        .get_issue(issue.id)
        .expect("lookup")
        .expect("issue should remain");
    assert_eq!(reloaded.tag_ids, vec![ui]);
}

#[test]
fn tag_patch_can_clear_color() {
    let mut fx = fixture();
    let updated = fx
        .store
        .update_tag(
            fx.bug.id,
            TagPatch {
                name: None,
                color: Some(None),
            },
        )
        .expect("tag update should succeed");
    assert_eq!(updated.name, "bug");
    assert_eq!(updated.color, None);
}

#[test]
fn deleting_a_user_removes_authored_work_and_unassigns() {
    let mut fx = fixture();
    let (alice, bob, open, high) = (fx.alice.id, fx.bob.id, fx.open.id, fx.high.id);
    let bobs = fx.issue("Bob's", bob, open, high, Vec::new());
    let alices = fx.issue("Alice's", alice, open, high, Vec::new());
    fx.store
        .update_issue(
            alices.id,
            IssuePatch {
                assignee_id: Some(Some(bob)),
                ..IssuePatch::default()
            },
        )
        .expect("assignment should succeed");
    let bob_comment = fx.comment(alices.id, bob, "on it");

    fx.store.delete_user(bob).expect("user delete should succeed");

    assert!(fx.store.get_issue(bobs.id).expect("lookup").is_none());
    assert!(fx.store.get_comment(bob_comment.id).expect("lookup").is_none());
    let alices = fx
        .store
        .get_issue(alices.id)
        .expect("lookup")
        .expect("alice's issue should remain");
    assert_eq!(alices.assignee_id, None);
}

#[test]
fn comment_requires_existing_issue_and_content() {
    let mut fx = fixture();
    let (alice, open, high) = (fx.alice.id, fx.open.id, fx.high.id);
    let issue = fx.issue("Bug", alice, open, high, Vec::new());

    let err = fx
        .store
        .create_comment(tracker_storage::CreateCommentRequest {
            issue_id: 404,
            author_id: alice,
            content: "hello".to_string(),
        })
        .expect_err("missing issue must fail");
    assert_eq!(err.code(), "NOT_FOUND");

    let err = fx
        .store
        .create_comment(tracker_storage::CreateCommentRequest {
            issue_id: issue.id,
            author_id: alice,
            content: "\n ".to_string(),
        })
        .expect_err("blank content must fail");
    assert_eq!(err.code(), "VALIDATION_ERROR");
}

#[test]
fn comment_update_refreshes_its_own_timestamp() {
    let mut fx = fixture();
    let (alice, open, high) = (fx.alice.id, fx.open.id, fx.high.id);
    let issue = fx.issue("Bug", alice, open, high, Vec::new());
    let comment = fx.comment(issue.id, alice, "draft");
    std::thread::sleep(std::time::Duration::from_millis(2));

    let updated = fx
        .store
        .update_comment(comment.id, "final")
        .expect("comment update should succeed");
    assert_eq!(updated.content, "final");
    assert!(updated.updated_at_ms > comment.updated_at_ms);
    assert_eq!(updated.created_at_ms, comment.created_at_ms);
}

#[test]
fn views_resolve_names_for_every_reference() {
    let mut fx = fixture();
    let (alice, bob, open, high, bug) = (fx.alice.id, fx.bob.id, fx.open.id, fx.high.id, fx.bug.id);
    let issue = fx.issue("Bug", alice, open, high, vec![bug]);
    fx.store
        .update_issue(
            issue.id,
            IssuePatch {
                assignee_id: Some(Some(bob)),
                ..IssuePatch::default()
            },
        )
        .expect("assignment should succeed");
    fx.comment(issue.id, bob, "seen it");

    let view = fx
        .store
        .issue_view(issue.id)
        .expect("lookup should succeed")
        .expect("view should exist");
    assert_eq!(view.status.name, "open");
    assert_eq!(view.priority.name, "high");
    assert_eq!(view.author.name, "Alice");
    assert_eq!(
        view.assignee.as_ref().map(|assignee| assignee.name.as_str()),
        Some("Bob")
    );
    assert_eq!(view.tags.len(), 1);
    assert_eq!(view.tags[0].color.as_deref(), Some("red"));
    assert_eq!(view.comment_count, 1);

    let page = fx
        .store
        .list_issues(&IssueQuery::default())
        .expect("list should succeed");
    assert_eq!(page.total_count, 1);
    assert_eq!(page.data[0], view);
}
