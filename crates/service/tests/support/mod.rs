#![allow(dead_code)]

use argon2::Params;
use tracker_core::ids::UserId;
use tracker_core::model::TaxonomyKind;
use tracker_service::{
    Argon2Credentials, HmacTokenService, IssueTracker, RegisterUser, TaxonomyName,
};
use tracker_storage::SqliteStore;

pub type Tracker = IssueTracker<Argon2Credentials, HmacTokenService>;

pub const SECRET: &[u8] = b"integration-secret-0123456789abcdef";
pub const PASSWORD: &str = "correct horse";

pub struct Session {
    pub id: UserId,
    pub token: String,
}

pub fn tracker() -> Tracker {
    let store = SqliteStore::open_in_memory().expect("open in-memory store");
    let params = Params::new(8, 1, 1, None).expect("cheap argon2 params");
    IssueTracker::new(
        store,
        Argon2Credentials::with_params(params),
        HmacTokenService::new(SECRET, 3600),
    )
}

pub fn register(tracker: &Tracker, name: &str, email: &str) -> Session {
    let (profile, token) = tracker
        .register(RegisterUser::new(name, email, PASSWORD))
        .expect("register user");
    Session {
        id: profile.id,
        token,
    }
}

pub fn admin(tracker: &Tracker, email: &str) -> Session {
    let session = register(tracker, "Admin", email);
    tracker
        .promote_admin(email)
        .expect("promote admin")
        .expect("admin account exists");
    session
}

/// Two regular users, an admin, and one status and priority.
pub struct Board {
    pub tracker: Tracker,
    pub alice: Session,
    pub bob: Session,
    pub admin: Session,
    pub open: i64,
    pub high: i64,
}

pub fn board() -> Board {
    let tracker = tracker();
    let alice = register(&tracker, "Alice", "alice@example.com");
    let bob = register(&tracker, "Bob", "bob@example.com");
    let admin = admin(&tracker, "admin@example.com");
    let open = tracker
        .create_taxonomy(&admin.token, TaxonomyKind::Status, TaxonomyName::new("open"))
        .expect("create status")
        .id;
    let high = tracker
        .create_taxonomy(&admin.token, TaxonomyKind::Priority, TaxonomyName::new("high"))
        .expect("create priority")
        .id;
    Board {
        tracker,
        alice,
        bob,
        admin,
        open,
        high,
    }
}
