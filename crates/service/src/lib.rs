#![forbid(unsafe_code)]

//! Issue tracker service: authentication, authorization and ordered
//! mutation on top of `tracker_storage`.

mod args;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod seed;
pub mod tokens;
pub mod tracker;

pub use args::Args;
pub use commands::{
    CreateComment, CreateIssue, CreateTag, Login, RegisterUser, TaxonomyName, UpdateComment,
    UpdateIssue, UpdateProfile, UpdateTag,
};
pub use config::{ConfigError, Invocation, LogFormat, TrackerConfig};
pub use credentials::{Argon2Credentials, CredentialError, CredentialService};
pub use error::{ErrorEnvelope, ServiceError};
pub use seed::SeedReport;
pub use tokens::{HmacTokenService, TokenError, TokenService};
pub use tracker::IssueTracker;
