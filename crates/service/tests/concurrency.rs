mod support;

use std::sync::{Arc, Barrier};
use std::thread;
use support::{PASSWORD, board, tracker};
use tracker_core::query::QueryParams;
use tracker_core::timestamp::{DayEdge, parse_timestamp_ms};
use tracker_service::{CreateIssue, RegisterUser, ServiceError, UpdateIssue};

#[test]
fn concurrent_registrations_with_one_email_admit_exactly_one() {
    let tracker = Arc::new(tracker());
    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|n| {
            let tracker = Arc::clone(&tracker);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                tracker.register(RegisterUser::new(&format!("Racer {n}"), "race@x.com", PASSWORD))
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.join().expect("thread finished") {
            Ok(_) => created += 1,
            Err(ServiceError::DuplicateEmail) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(created, 1);
}

#[test]
fn readers_never_see_half_applied_updates() {
    let board = board();
    let issue_id = board
        .tracker
        .create_issue(&board.alice.token, CreateIssue::new("t0", board.open, board.high))
        .expect("create")
        .id;
    let tracker = Arc::new(board.tracker);
    let token = board.alice.token.clone();

    let writer = {
        let tracker = Arc::clone(&tracker);
        thread::spawn(move || {
            for n in 1..=20 {
                tracker
                    .update_issue(
                        &token,
                        issue_id,
                        UpdateIssue {
                            title: Some(format!("t{n}")),
                            description: Some(Some(format!("t{n}"))),
                            ..UpdateIssue::default()
                        },
                    )
                    .expect("update");
            }
        })
    };

    for _ in 0..40 {
        let page = tracker.list_issues(&QueryParams::new()).expect("list");
        let seen = &page.data[0];
        if let Some(description) = &seen.description {
            assert_eq!(description, &seen.title);
        }
        let created = parse_timestamp_ms(&seen.created_at, DayEdge::Start).expect("createdAt");
        let updated = parse_timestamp_ms(&seen.updated_at, DayEdge::Start).expect("updatedAt");
        assert!(updated >= created, "{} < {}", seen.updated_at, seen.created_at);
    }
    writer.join().expect("writer finished");
    assert_eq!(tracker.get_issue(issue_id).expect("final").title, "t20");
}
