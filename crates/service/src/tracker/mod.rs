#![forbid(unsafe_code)]

//! Request orchestration.
//!
//! A write runs in a fixed order: verify the token, resolve the actor and
//! the target, authorize, validate the payload, then let the store check
//! references and commit. Everything after token verification happens while
//! holding the store lock, so a request never observes another one halfway.

mod comments;
mod issues;
mod taxonomy;
mod users;

use crate::credentials::{Argon2Credentials, CredentialService};
use crate::error::ServiceError;
use crate::tokens::{HmacTokenService, TokenService};
use std::sync::{Mutex, MutexGuard, OnceLock};
use tracker_core::ids::UserId;
use tracker_core::policy::{self, Action, Actor};
use tracker_storage::SqliteStore;

pub struct IssueTracker<C = Argon2Credentials, T = HmacTokenService> {
    store: Mutex<SqliteStore>,
    credentials: C,
    tokens: T,
    /// Digest checked when a login names no account, so an unknown email
    /// costs the same as a wrong password.
    decoy_digest: OnceLock<Option<String>>,
}

impl<C, T> std::fmt::Debug for IssueTracker<C, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssueTracker").finish_non_exhaustive()
    }
}

impl<C: CredentialService, T: TokenService> IssueTracker<C, T> {
    pub fn new(store: SqliteStore, credentials: C, tokens: T) -> Self {
        Self {
            store: Mutex::new(store),
            credentials,
            tokens,
            decoy_digest: OnceLock::new(),
        }
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, SqliteStore>, ServiceError> {
        self.store
            .lock()
            .map_err(|_| ServiceError::internal("store lock poisoned"))
    }

    pub(crate) fn credentials(&self) -> &C {
        &self.credentials
    }

    fn decoy_digest(&self) -> Option<&str> {
        self.decoy_digest
            .get_or_init(|| match self.credentials.hash("decoy password") {
                Ok(digest) => Some(digest),
                Err(err) => {
                    tracing::error!(error = %err, "decoy digest unavailable");
                    None
                }
            })
            .as_deref()
    }

    /// Accepts the raw token or an `Authorization` header value.
    fn token_user(&self, token: &str) -> Result<UserId, ServiceError> {
        let token = token.trim();
        let token = token.strip_prefix("Bearer ").unwrap_or(token);
        match self.tokens.verify(token) {
            Some(user_id) => Ok(user_id),
            None => {
                tracing::warn!("rejected bearer token");
                Err(ServiceError::Unauthenticated)
            }
        }
    }
}

/// The token may outlive its user; such a token no longer authenticates.
fn resolve_actor(store: &SqliteStore, user_id: UserId) -> Result<Actor, ServiceError> {
    match store.get_user(user_id)? {
        Some(user) => Ok(Actor::from(&user)),
        None => {
            tracing::warn!(user_id, "token names a deleted user");
            Err(ServiceError::Unauthenticated)
        }
    }
}

fn authorize(actor: &Actor, action: Action) -> Result<(), ServiceError> {
    policy::authorize(actor, action).map_err(|denied| {
        tracing::warn!(
            actor_id = actor.id,
            action = action.as_str(),
            "authorization denied"
        );
        ServiceError::from(denied)
    })
}
