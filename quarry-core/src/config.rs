//! Connection settings for the bundled SQLite adapter

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable checked first by [`ConnectionConfig::from_env`]
pub const URL_ENV: &str = "QUARRY_DATABASE_URL";

/// Fallback environment variable
pub const FALLBACK_URL_ENV: &str = "DATABASE_URL";

pub const DEFAULT_URL: &str = "sqlite::memory:";

/// How to open a database connection.
///
/// Missing keys in a JSON document take their default values.
///
/// # Examples
/// ```
/// use quarry_core::ConnectionConfig;
///
/// let config = ConnectionConfig::new("sqlite://app.db").foreign_keys(false);
/// assert_eq!(config.url, "sqlite://app.db");
/// assert!(!config.foreign_keys);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub url: String,
    pub foreign_keys: bool,
    pub create_if_missing: bool,
    pub busy_timeout_ms: u64,
    pub statement_cache_capacity: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            foreign_keys: true,
            create_if_missing: true,
            busy_timeout_ms: 5000,
            statement_cache_capacity: 100,
        }
    }
}

impl ConnectionConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Private in-memory database
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    pub fn create_if_missing(mut self, enabled: bool) -> Self {
        self.create_if_missing = enabled;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn statement_cache_capacity(mut self, capacity: usize) -> Self {
        self.statement_cache_capacity = capacity;
        self
    }

    pub fn busy_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Read the URL from `QUARRY_DATABASE_URL`, then `DATABASE_URL`,
    /// falling back to an in-memory database
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = [URL_ENV, FALLBACK_URL_ENV]
            .into_iter()
            .filter_map(|key| lookup(key))
            .find(|url| !url.trim().is_empty());

        match url {
            Some(url) => {
                tracing::debug!(url = %url, "database url taken from environment");
                Self::new(url)
            }
            None => Self::default(),
        }
    }

    /// Parse a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("malformed connection config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot open a connection
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::config("database url is empty"));
        }
        if !self.url.starts_with("sqlite:") {
            return Err(Error::config(format!(
                "unsupported database url '{}': only sqlite: urls are supported",
                self.url
            )));
        }
        Ok(())
    }
}
