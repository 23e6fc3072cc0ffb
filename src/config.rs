use crate::errors::DbError;
use serde::Deserialize;
use std::path::Path;

/// Connection-pool configuration consumed by `Database::connect`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost:5432/postgres".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

impl DbConfig {
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self { database_url: database_url.into(), ..Self::default() }
    }

    /// Reads configuration from environment variables if present:
    /// - `DOCREL_DATABASE_URL`
    /// - `DOCREL_MAX_CONNECTIONS`
    /// - `DOCREL_ACQUIRE_TIMEOUT_SECS`
    #[must_use]
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(url) = std::env::var("DOCREL_DATABASE_URL") {
            cfg.database_url = url;
        }
        if let Ok(raw) = std::env::var("DOCREL_MAX_CONNECTIONS")
            && let Ok(n) = raw.parse()
        {
            cfg.max_connections = n;
        }
        if let Ok(raw) = std::env::var("DOCREL_ACQUIRE_TIMEOUT_SECS")
            && let Ok(n) = raw.parse()
        {
            cfg.acquire_timeout_secs = n;
        }
        cfg
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns `DbError::Config` if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, DbError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DbError::Config(format!("read {}: {e}", path.display())))?;
        toml::from_str(&raw).map_err(|e| DbError::Config(format!("parse {}: {e}", path.display())))
    }
}
