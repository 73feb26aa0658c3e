//! Runtime configuration for hosts embedding the pet directory.
//!
//! # Invariants
//! - A validated config carries a normalized log level.
//! - `log_dir`, when set, is absolute.

use crate::logging::{default_log_level, normalize_level, normalize_log_dir};
use std::path::PathBuf;

pub const DEFAULT_DB_FILE_NAME: &str = "petdir.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// SQLite database file holding the `cats`, `dogs` and `owners` collections.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Directory for rolling log files. Logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl ServiceConfig {
    /// Normalizes the log level and checks the log directory.
    pub fn validate(mut self) -> Result<Self, String> {
        if self.db_path.as_os_str().is_empty() {
            return Err("db_path cannot be empty".to_string());
        }
        self.log_level = normalize_level(&self.log_level)?.to_string();
        self.log_dir = match self.log_dir.take() {
            Some(dir) => Some(normalize_log_dir(&dir.to_string_lossy())?),
            None => None,
        };
        Ok(self)
    }
}
