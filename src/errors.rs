use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Config error: {0}")]
    Config(String),
}
