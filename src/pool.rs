use crate::config::DbConfig;
use crate::errors::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::Row;
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions};
use std::time::Duration;

/// Column list every document query selects, in `DocRow` field order.
pub const DOC_COLUMNS: &str = "id, doc, created_at, updated_at";

/// A positionally-bound statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Timestamp(DateTime<Utc>),
    Json(Value),
}

/// One physical row of a collection table.
#[derive(Debug, Clone, PartialEq)]
pub struct DocRow {
    pub id: String,
    pub doc: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The relational collaborator: executes one parameterized statement per
/// call, with `$1, $2, …` placeholders. The adapter adds no retries or
/// timeouts of its own; executor failures surface to the caller unchanged.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Runs a SELECT returning document rows (`DOC_COLUMNS` shape).
    async fn fetch_rows(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<DocRow>, DbError>;

    /// Runs a single-scalar SELECT (e.g. `COUNT(*)`).
    async fn fetch_count(&self, sql: &str, params: &[SqlValue]) -> Result<i64, DbError>;

    /// Runs a statement and reports the affected row count.
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64, DbError>;
}

/// Production executor over a shared `sqlx` Postgres pool.
///
/// All SQL is runtime-checked (`sqlx::query`, not `sqlx::query!`) so builds
/// never require a live database.
pub struct PgExecutor {
    pool: PgPool,
}

impl PgExecutor {
    /// Connects a new pool from the given configuration.
    ///
    /// # Errors
    /// Returns `DbError::Sql` if the pool cannot be established.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Wraps an externally-owned pool.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn bind_params<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    params: &[SqlValue],
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    params.iter().fold(query, |q, p| match p {
        SqlValue::Text(s) => q.bind(s.clone()),
        SqlValue::Timestamp(t) => q.bind(*t),
        SqlValue::Json(v) => q.bind(v.clone()),
    })
}

#[async_trait]
impl SqlExecutor for PgExecutor {
    async fn fetch_rows(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<DocRow>, DbError> {
        let rows = bind_params(sqlx::query(sql), params).fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| {
                Ok(DocRow {
                    id: row.try_get("id")?,
                    doc: row.try_get("doc")?,
                    created_at: row.try_get("created_at")?,
                    updated_at: row.try_get("updated_at")?,
                })
            })
            .collect()
    }

    async fn fetch_count(&self, sql: &str, params: &[SqlValue]) -> Result<i64, DbError> {
        let query = params.iter().fold(sqlx::query_scalar::<_, i64>(sql), |q, p| match p {
            SqlValue::Text(s) => q.bind(s.clone()),
            SqlValue::Timestamp(t) => q.bind(*t),
            SqlValue::Json(v) => q.bind(v.clone()),
        });
        Ok(query.fetch_one(&self.pool).await?)
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64, DbError> {
        let done = bind_params(sqlx::query(sql), params).execute(&self.pool).await?;
        Ok(done.rows_affected())
    }
}
