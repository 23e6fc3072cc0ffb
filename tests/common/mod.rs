#![allow(dead_code)]

// Scripted executor for façade tests: enqueue responses in call order, then
// assert the statements the adapter issued.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docrel::Database;
use docrel::errors::DbError;
use docrel::pool::{DocRow, SqlExecutor, SqlValue};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub enum MockResponse {
    Rows(Vec<DocRow>),
    Count(i64),
    Affected(u64),
    Fail,
}

#[derive(Default)]
pub struct MockExecutor {
    calls: Mutex<Vec<(String, Vec<SqlValue>)>>,
    responses: Mutex<VecDeque<MockResponse>>,
}

impl MockExecutor {
    pub fn script(responses: Vec<MockResponse>) -> Self {
        Self { calls: Mutex::new(Vec::new()), responses: Mutex::new(responses.into()) }
    }

    fn record(&self, sql: &str, params: &[SqlValue]) -> MockResponse {
        self.calls.lock().unwrap().push((sql.to_string(), params.to_vec()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("mock executor ran out of scripted responses")
    }

    pub fn call(&self, idx: usize) -> (String, Vec<SqlValue>) {
        self.calls.lock().unwrap()[idx].clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SqlExecutor for MockExecutor {
    async fn fetch_rows(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<DocRow>, DbError> {
        match self.record(sql, params) {
            MockResponse::Rows(rows) => Ok(rows),
            MockResponse::Fail => Err(DbError::Sql(sqlx::Error::PoolTimedOut)),
            _ => panic!("scripted response mismatch for fetch_rows: {sql}"),
        }
    }

    async fn fetch_count(&self, sql: &str, params: &[SqlValue]) -> Result<i64, DbError> {
        match self.record(sql, params) {
            MockResponse::Count(n) => Ok(n),
            MockResponse::Fail => Err(DbError::Sql(sqlx::Error::PoolTimedOut)),
            _ => panic!("scripted response mismatch for fetch_count: {sql}"),
        }
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64, DbError> {
        match self.record(sql, params) {
            MockResponse::Affected(n) => Ok(n),
            MockResponse::Fail => Err(DbError::Sql(sqlx::Error::PoolTimedOut)),
            _ => panic!("scripted response mismatch for execute: {sql}"),
        }
    }
}

/// Database over a scripted executor; keep the Arc to inspect recorded calls.
pub fn scripted(responses: Vec<MockResponse>) -> (Database, Arc<MockExecutor>) {
    let mock = Arc::new(MockExecutor::script(responses));
    (Database::with_executor(mock.clone()), mock)
}

pub fn ts(raw: &str) -> DateTime<Utc> {
    raw.parse().expect("test timestamp")
}

pub fn row(id: &str, doc: serde_json::Value, created_at: &str, updated_at: &str) -> DocRow {
    DocRow { id: id.to_string(), doc, created_at: ts(created_at), updated_at: ts(updated_at) }
}
