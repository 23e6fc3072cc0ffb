use crate::collection::Collection;
use crate::document::Document;
use crate::errors::DbError;
use serde_json::Value;

/// A deferred, chainable query descriptor.
///
/// The cursor has two states: configured (accepting `sort`/`skip`/`limit`/
/// `project`) and materialized. `to_array` fetches the whole result set in
/// one query, with no intermediate streaming state; calling it again issues
/// a fresh query.
#[derive(Clone)]
pub struct Cursor<'a> {
    collection: &'a Collection,
    filter: Value,
    sort: Option<Value>,
    skip: Option<u64>,
    limit: Option<u64>,
    projection: Option<Value>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(collection: &'a Collection, filter: Value) -> Self {
        Self { collection, filter, sort: None, skip: None, limit: None, projection: None }
    }

    #[must_use]
    pub fn sort(mut self, spec: Value) -> Self {
        self.sort = Some(spec);
        self
    }

    #[must_use]
    pub fn skip(mut self, n: u64) -> Self {
        self.skip = Some(n);
        self
    }

    #[must_use]
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    #[must_use]
    pub fn project(mut self, spec: Value) -> Self {
        self.projection = Some(spec);
        self
    }

    /// Materializes the configured query.
    ///
    /// # Errors
    /// Surfaces filter-compilation and executor failures unchanged.
    pub async fn to_array(&self) -> Result<Vec<Document>, DbError> {
        self.collection
            .run_find(
                &self.filter,
                self.sort.as_ref(),
                self.skip,
                self.limit,
                self.projection.as_ref(),
            )
            .await
    }
}
