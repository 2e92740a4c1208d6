//! Runtime configuration read from the environment.
//!
//! | Variable            | Default                 |
//! |---------------------|-------------------------|
//! | `LAUNDRY_DB_PATH`   | `laundry.db`            |
//! | `LAUNDRY_LOG_LEVEL` | `default_log_level()`   |
//! | `LAUNDRY_LOG_DIR`   | unset (logging off)     |

use crate::logging::{default_log_level, init_logging};
use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "laundry.db";

pub const DB_PATH_VAR: &str = "LAUNDRY_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "LAUNDRY_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "LAUNDRY_LOG_DIR";

/// Process-wide settings for the laundry tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaundryConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for LaundryConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl LaundryConfig {
    /// Loads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let mut config = Self::default();
        if let Some(db_path) = value(DB_PATH_VAR) {
            config.db_path = PathBuf::from(db_path);
        }
        if let Some(level) = value(LOG_LEVEL_VAR) {
            config.log_level = level;
        }
        if let Some(dir) = value(LOG_DIR_VAR) {
            let dir = PathBuf::from(dir);
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir));
            }
            config.log_dir = Some(dir);
        }
        Ok(config)
    }

    /// Starts file logging when `log_dir` is set.
    ///
    /// Returns `Ok(false)` when file logging is disabled.
    pub fn init_logging(&self) -> Result<bool, String> {
        match self.log_dir.as_deref() {
            Some(dir) => init_logging(&self.log_level, dir).map(|()| true),
            None => Ok(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RelativeLogDir(dir) => write!(
                f,
                "{LOG_DIR_VAR} must be an absolute path, got `{}`",
                dir.display()
            ),
        }
    }
}

impl Error for ConfigError {}
