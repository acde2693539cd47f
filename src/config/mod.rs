//! Configuration management for `trackstar`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. Environment variables (`TRACKSTAR_DB`, `TRACKSTAR_LOCK_TIMEOUT_MS`,
//!    `TRACKSTAR_ROLES`)
//! 2. Config file (`trackstar.yaml`)
//! 3. Defaults

use crate::error::{Result, TrackerError};
use crate::service::StaticRoleProvider;
use crate::storage::SqliteStorage;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default database filename used when nothing else is configured.
const DEFAULT_DB_FILENAME: &str = "trackstar.db";

/// Default role vocabulary for project membership.
const DEFAULT_ROLES: &[&str] = &["owner", "member", "reader"];

/// Runtime settings for the tracker core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Path to the `SQLite` database file.
    pub database: PathBuf,

    /// Busy timeout passed to the connection, in milliseconds.
    #[serde(default)]
    pub lock_timeout_ms: Option<u64>,

    /// Role names the role provider will report.
    #[serde(default = "default_roles")]
    pub roles: Vec<String>,
}

fn default_roles() -> Vec<String> {
    DEFAULT_ROLES.iter().map(ToString::to_string).collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DB_FILENAME),
            lock_timeout_ms: None,
            roles: default_roles(),
        }
    }
}

impl Settings {
    /// Load settings from an optional YAML file, then apply environment
    /// overrides.
    ///
    /// A missing file is not an error; defaults are used.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed,
    /// or if an environment override has an invalid value.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(path)?;
                serde_yaml::from_str(&contents)?
            }
            _ => Self::default(),
        };

        settings.apply_env_from(|key| env::var(key).ok())?;
        Ok(settings)
    }

    /// Apply environment-style overrides from a lookup function.
    ///
    /// Split out from [`Settings::load`] so tests can exercise override
    /// parsing without mutating process environment.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if `TRACKSTAR_LOCK_TIMEOUT_MS` is not an
    /// unsigned integer.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(db) = lookup("TRACKSTAR_DB") {
            self.database = PathBuf::from(db);
        }

        if let Some(timeout) = lookup("TRACKSTAR_LOCK_TIMEOUT_MS") {
            let parsed = timeout.parse::<u64>().map_err(|_| {
                TrackerError::Config(format!(
                    "TRACKSTAR_LOCK_TIMEOUT_MS must be an unsigned integer, got '{timeout}'"
                ))
            })?;
            self.lock_timeout_ms = Some(parsed);
        }

        if let Some(roles) = lookup("TRACKSTAR_ROLES") {
            let parsed: Vec<String> = roles
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(ToString::to_string)
                .collect();
            if !parsed.is_empty() {
                self.roles = parsed;
            }
        }

        Ok(())
    }

    /// Open the configured database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_storage(&self) -> Result<SqliteStorage> {
        SqliteStorage::open_with_timeout(&self.database, self.lock_timeout_ms)
    }

    /// Build a role provider from the configured role names.
    #[must_use]
    pub fn role_provider(&self) -> StaticRoleProvider {
        StaticRoleProvider::new(self.roles.iter().cloned())
    }
}
