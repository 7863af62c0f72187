#![forbid(unsafe_code)]

//! Process configuration: CLI flags first, then environment, then defaults.

use crate::tokens::{DEFAULT_TOKEN_TTL_SECS, MIN_SECRET_LEN};
use std::path::PathBuf;

pub const DEFAULT_STORAGE_DIR: &str = ".issue_tracker";
pub const DEFAULT_DB_FILE: &str = "issue_tracker.db";
pub const DEFAULT_LOG_FILTER: &str = "tracker_service=info,tracker_storage=info";
pub const DEFAULT_SEED_PASSWORD: &str = "password";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown flag: {0}")]
    UnknownFlag(String),
    #[error("{0} requires a value")]
    MissingValue(&'static str),
    #[error("{key} must be a non-negative integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("log format must be json or pretty, got {0:?}")]
    InvalidLogFormat(String),
    #[error("token secret must be at least {MIN_SECRET_LEN} bytes, got {0}")]
    WeakSecret(usize),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidLogFormat(raw.to_string())),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub storage_dir: PathBuf,
    pub database: PathBuf,
    /// `None` means a random secret for this process.
    pub token_secret: Option<Vec<u8>>,
    pub token_ttl_secs: u64,
    pub log_filter: String,
    pub log_format: LogFormat,
    pub seed: bool,
    /// Shared by every demo account the seed creates.
    pub seed_password: String,
    pub admin_email: Option<String>,
}

impl std::fmt::Debug for TrackerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerConfig")
            .field("storage_dir", &self.storage_dir)
            .field("database", &self.database)
            .field("token_secret", &self.token_secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("log_filter", &self.log_filter)
            .field("log_format", &self.log_format)
            .field("seed", &self.seed)
            .field("seed_password", &"<redacted>")
            .field("admin_email", &self.admin_email)
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Invocation {
    Run(Box<TrackerConfig>),
    Help,
    Version,
}

#[derive(Default)]
struct Flags {
    storage_dir: Option<String>,
    database: Option<String>,
    token_secret: Option<String>,
    token_ttl_secs: Option<String>,
    log: Option<String>,
    log_format: Option<String>,
    seed: bool,
    seed_password: Option<String>,
    admin_email: Option<String>,
}

impl TrackerConfig {
    /// Reads the real process arguments and environment. Call after
    /// `dotenvy::dotenv()` so `.env` values are visible.
    pub fn from_process() -> Result<Invocation, ConfigError> {
        Self::parse(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// `args` excludes the program name.
    pub fn parse(
        args: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Invocation, ConfigError> {
        let mut flags = Flags::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let slot = match arg.as_str() {
                "-h" | "--help" => return Ok(Invocation::Help),
                "-V" | "--version" => return Ok(Invocation::Version),
                "--seed" => {
                    flags.seed = true;
                    continue;
                }
                "--storage-dir" => &mut flags.storage_dir,
                "--database" => &mut flags.database,
                "--token-secret" => &mut flags.token_secret,
                "--token-ttl-secs" => &mut flags.token_ttl_secs,
                "--log" => &mut flags.log,
                "--log-format" => &mut flags.log_format,
                "--seed-password" => &mut flags.seed_password,
                "--admin-email" => &mut flags.admin_email,
                _ => return Err(ConfigError::UnknownFlag(arg)),
            };
            let Some(value) = args.next() else {
                return Err(ConfigError::MissingValue(flag_name(&arg)));
            };
            *slot = Some(value);
        }

        let pick = |flag: Option<String>, key: &str| flag.or_else(|| non_empty(env(key)));

        let storage_dir = PathBuf::from(
            pick(flags.storage_dir, "TRACKER_STORAGE_DIR")
                .unwrap_or_else(|| DEFAULT_STORAGE_DIR.to_string()),
        );
        let database = flags
            .database
            .or_else(|| non_empty(env("DATABASE_URL")))
            .map(|raw| PathBuf::from(strip_sqlite_scheme(&raw)))
            .unwrap_or_else(|| storage_dir.join(DEFAULT_DB_FILE));

        let token_secret = match pick(flags.token_secret, "TRACKER_TOKEN_SECRET") {
            Some(secret) if secret.len() < MIN_SECRET_LEN => {
                return Err(ConfigError::WeakSecret(secret.len()));
            }
            Some(secret) => Some(secret.into_bytes()),
            None => None,
        };

        let token_ttl_secs = match pick(flags.token_ttl_secs, "TRACKER_TOKEN_TTL_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNumber {
                    key: "token ttl",
                    value: raw,
                })?,
            None => DEFAULT_TOKEN_TTL_SECS,
        };

        let log_filter = flags
            .log
            .or_else(|| non_empty(env("RUST_LOG")))
            .or_else(|| non_empty(env("TRACKER_LOG")))
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        let log_format = match pick(flags.log_format, "TRACKER_LOG_FORMAT") {
            Some(raw) => LogFormat::parse(&raw)?,
            None => LogFormat::default(),
        };

        let seed = flags.seed || env("TRACKER_SEED").is_some_and(|raw| truthy(&raw));
        let seed_password = pick(flags.seed_password, "TRACKER_SEED_PASSWORD")
            .unwrap_or_else(|| DEFAULT_SEED_PASSWORD.to_string());
        let admin_email = pick(flags.admin_email, "TRACKER_ADMIN_EMAIL");

        Ok(Invocation::Run(Box::new(Self {
            storage_dir,
            database,
            token_secret,
            token_ttl_secs,
            log_filter,
            log_format,
            seed,
            seed_password,
            admin_email,
        })))
    }
}

pub fn usage() -> &'static str {
    "tracker - issue tracker core\n\n\
USAGE:\n\
  tracker [--storage-dir DIR] [--database PATH] [--admin-email EMAIL]\n\
          [--seed] [--seed-password PASSWORD]\n\
          [--token-secret SECRET] [--token-ttl-secs N]\n\
          [--log FILTER] [--log-format json|pretty]\n\
\n\
FLAGS:\n\
  -h, --help       Print this help and exit\n\
  -V, --version    Print version and exit\n\
\n\
ENVIRONMENT:\n\
  TRACKER_STORAGE_DIR, DATABASE_URL, TRACKER_TOKEN_SECRET, TRACKER_TOKEN_TTL_SECS,\n\
  RUST_LOG, TRACKER_LOG, TRACKER_LOG_FORMAT, TRACKER_SEED, TRACKER_SEED_PASSWORD, TRACKER_ADMIN_EMAIL\n\
  A .env file in the working directory is loaded first.\n"
}

fn flag_name(arg: &str) -> &'static str {
    match arg {
        "--storage-dir" => "--storage-dir",
        "--database" => "--database",
        "--token-secret" => "--token-secret",
        "--token-ttl-secs" => "--token-ttl-secs",
        "--log" => "--log",
        "--log-format" => "--log-format",
        "--seed-password" => "--seed-password",
        _ => "--admin-email",
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn strip_sqlite_scheme(raw: &str) -> &str {
    raw.strip_prefix("sqlite://")
        .or_else(|| raw.strip_prefix("sqlite:"))
        .unwrap_or(raw)
}

fn truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
