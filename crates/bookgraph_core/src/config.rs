//! Runtime configuration for hosts embedding the core.
//!
//! # Responsibility
//! - Collect log and database settings in one value.
//! - Read them from `BOOKGRAPH_*` environment variables on request.
//!
//! # Invariants
//! - The library never reads the environment implicitly; hosts call
//!   `CoreConfig::from_env` themselves.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const ENV_LOG_LEVEL: &str = "BOOKGRAPH_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "BOOKGRAPH_LOG_DIR";
pub const ENV_DB_PATH: &str = "BOOKGRAPH_DB_PATH";

/// Host configuration for logging and storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute log directory; `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
    /// SQLite file; `None` uses an in-memory database.
    pub db_path: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            db_path: None,
        }
    }
}

impl CoreConfig {
    /// Builds a config from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; blank values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        Self {
            log_level: read(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
            db_path: read(ENV_DB_PATH).map(PathBuf::from),
        }
    }
}
