//! docrel: a MongoDB-style document store adapter over PostgreSQL.
//!
//! Application code issues filter/update objects (`$or`, `$gte`, `$in`,
//! `$set`, `$setOnInsert`, …) against tables that hold each logical
//! document as a JSONB payload plus indexed identity and timestamp columns.
//! Filters compile to parameterized SQL; nothing caller-supplied is ever
//! interpolated into statement text.

pub mod collection;
pub mod config;
pub mod document;
pub mod errors;
pub mod logger;
pub mod pool;
pub mod query;
pub mod types;

use crate::collection::Collection;
use crate::config::DbConfig;
use crate::errors::DbError;
use crate::pool::{PgExecutor, SqlExecutor};
use std::sync::Arc;

/// The main adapter handle: owns the executor and hands out collections.
pub struct Database {
    executor: Arc<dyn SqlExecutor>,
}

impl Database {
    /// Connects a Postgres pool from the given configuration.
    ///
    /// # Errors
    /// Returns `DbError::Sql` if the pool cannot be established.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        let executor = PgExecutor::connect(config).await?;
        Ok(Self { executor: Arc::new(executor) })
    }

    /// Builds a database over an injected executor (embedding, tests).
    #[must_use]
    pub fn with_executor(executor: Arc<dyn SqlExecutor>) -> Self {
        Self { executor }
    }

    /// Returns a handle to the named collection. No I/O happens here; the
    /// backing table may not exist yet (see `ensure_collection`).
    #[must_use]
    pub fn collection(&self, name: &str) -> Collection {
        Collection::new(name.to_string(), Arc::clone(&self.executor))
    }

    /// Creates the collection's backing table if missing and returns its
    /// handle. Table names are developer-supplied constants.
    ///
    /// # Errors
    /// Surfaces executor failures unchanged.
    pub async fn ensure_collection(&self, name: &str) -> Result<Collection, DbError> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {name} (\
             id TEXT PRIMARY KEY, \
             doc JSONB NOT NULL, \
             created_at TIMESTAMPTZ NOT NULL, \
             updated_at TIMESTAMPTZ NOT NULL)"
        );
        log::debug!("ensure_collection: {sql}");
        self.executor.execute(&sql, &[]).await?;
        Ok(self.collection(name))
    }

    /// Drops the collection's backing table.
    ///
    /// # Errors
    /// Surfaces executor failures unchanged.
    pub async fn drop_collection(&self, name: &str) -> Result<(), DbError> {
        let sql = format!("DROP TABLE IF EXISTS {name}");
        log::debug!("drop_collection: {sql}");
        self.executor.execute(&sql, &[]).await?;
        Ok(())
    }

    /// Health check: one round trip through the pool.
    ///
    /// # Errors
    /// Surfaces executor failures unchanged.
    pub async fn ping(&self) -> Result<(), DbError> {
        self.executor.fetch_count("SELECT 1::BIGINT", &[]).await?;
        Ok(())
    }
}
