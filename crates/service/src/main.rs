#![forbid(unsafe_code)]

use std::error::Error;
use tracker_core::query::QueryParams;
use tracker_service::config::{self, Invocation, TrackerConfig};
use tracker_service::{Argon2Credentials, HmacTokenService, IssueTracker, logging};
use tracker_storage::SqliteStore;

fn version_line() -> String {
    format!("tracker {}", env!("CARGO_PKG_VERSION"))
}

fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();

    let config = match TrackerConfig::from_process()? {
        Invocation::Help => {
            print!("{}", config::usage());
            return Ok(());
        }
        Invocation::Version => {
            println!("{}", version_line());
            return Ok(());
        }
        Invocation::Run(config) => config,
    };

    logging::init(&config.log_filter, config.log_format);
    tracing::debug!(config = ?config, "configuration loaded");

    let store = SqliteStore::open_path(&config.database)?;
    let tokens = match &config.token_secret {
        Some(secret) => HmacTokenService::new(secret.clone(), config.token_ttl_secs),
        None => {
            tracing::warn!("no token secret configured; tokens will not survive a restart");
            HmacTokenService::random(config.token_ttl_secs)
        }
    };
    let tracker = IssueTracker::new(store, Argon2Credentials::new(), tokens);

    if config.seed {
        tracker.seed_demo(&config.seed_password)?;
    }
    if let Some(email) = &config.admin_email {
        match tracker.promote_admin(email)? {
            Some(profile) => tracing::info!(user_id = profile.id, "admin account ready"),
            None => tracing::warn!("no account matches the configured admin email"),
        }
    }

    tracing::info!(database = %config.database.display(), "issue tracker ready");
    let page = tracker.list_issues(&QueryParams::new())?;
    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}
