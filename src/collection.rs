use crate::document::{self, Document};
use crate::errors::DbError;
use crate::pool::{DOC_COLUMNS, SqlExecutor, SqlValue};
use crate::query::cursor::Cursor;
use crate::query::{
    DeleteReport, FindOneAndUpdateOptions, FindOneOptions, ReturnDocument, UpdateReport,
};
use crate::query::{filter, project, sort, update};
use crate::types::{CollectionName, DocumentId};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

/// A handle to one logical collection: a Postgres table holding one JSONB
/// document per row, next to its identity and timestamp columns.
///
/// Every operation is one awaited round trip (two for a fresh upsert
/// insert); failures from the executor surface unchanged.
#[derive(Clone)]
pub struct Collection {
    name: CollectionName,
    executor: Arc<dyn SqlExecutor>,
}

impl Collection {
    pub(crate) fn new(name: CollectionName, executor: Arc<dyn SqlExecutor>) -> Self {
        Self { name, executor }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    // The collection name doubles as the table name; both are
    // developer-supplied constants, never end-user input.
    fn table(&self) -> &str {
        &self.name
    }

    /// Returns the first matching document, or `None`.
    ///
    /// # Errors
    /// Surfaces filter-compilation and executor failures unchanged.
    pub async fn find_one(
        &self,
        filter_doc: &Value,
        options: &FindOneOptions,
    ) -> Result<Option<Document>, DbError> {
        let compiled = filter::compile(filter_doc, 1)?;
        let sql =
            format!("SELECT {DOC_COLUMNS} FROM {}{} LIMIT 1", self.table(), compiled.where_sql());
        log::debug!("find_one on {}: {sql}", self.name);
        let rows = self.executor.fetch_rows(&sql, &compiled.params).await?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };
        let doc = document::from_row(row)?;
        Ok(Some(match &options.projection {
            Some(spec) => project::apply(doc, spec),
            None => doc,
        }))
    }

    /// Returns a deferred cursor over every matching document.
    #[must_use]
    pub fn find(&self, filter_doc: Value) -> Cursor<'_> {
        Cursor::new(self, filter_doc)
    }

    pub(crate) async fn run_find(
        &self,
        filter_doc: &Value,
        sort_spec: Option<&Value>,
        skip: Option<u64>,
        limit: Option<u64>,
        projection: Option<&Value>,
    ) -> Result<Vec<Document>, DbError> {
        let compiled = filter::compile(filter_doc, 1)?;
        let mut sql = format!("SELECT {DOC_COLUMNS} FROM {}{}", self.table(), compiled.where_sql());
        if let Some(fragment) = sort_spec.and_then(sort::compile) {
            sql.push(' ');
            sql.push_str(&fragment);
        }
        if let Some(n) = limit {
            sql.push_str(&format!(" LIMIT {n}"));
        }
        if let Some(n) = skip {
            sql.push_str(&format!(" OFFSET {n}"));
        }
        log::debug!("find on {}: {sql}", self.name);
        let rows = self.executor.fetch_rows(&sql, &compiled.params).await?;
        let mut docs = Vec::with_capacity(rows.len());
        for row in rows {
            let doc = document::from_row(row)?;
            docs.push(match projection {
                Some(spec) => project::apply(doc, spec),
                None => doc,
            });
        }
        Ok(docs)
    }

    /// Counts matching rows.
    ///
    /// # Errors
    /// Surfaces filter-compilation and executor failures unchanged.
    pub async fn count_documents(&self, filter_doc: &Value) -> Result<u64, DbError> {
        let compiled = filter::compile(filter_doc, 1)?;
        let sql = format!("SELECT COUNT(*) FROM {}{}", self.table(), compiled.where_sql());
        log::debug!("count_documents on {}: {sql}", self.name);
        let n = self.executor.fetch_count(&sql, &compiled.params).await?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    /// Inserts one document, minting an identity and defaulting timestamps
    /// when the payload lacks them. Returns the document's identity.
    ///
    /// # Errors
    /// Returns `DbError::InvalidDocument` for non-object payloads or a
    /// non-scalar embedded identity.
    pub async fn insert_one(&self, doc: Value) -> Result<DocumentId, DbError> {
        let Value::Object(mut doc) = doc else {
            return Err(DbError::InvalidDocument("insert_one expects an object".into()));
        };
        let id = match doc.get(document::ID_FIELD) {
            None => document::new_document_id(),
            Some(v) => document::scalar_to_text(v)
                .ok_or_else(|| DbError::InvalidDocument("embedded _id must be a scalar".into()))?,
        };
        doc.insert(document::ID_FIELD.to_string(), Value::String(id.clone()));
        self.persist_new(&id, doc).await?;
        Ok(id)
    }

    // Single INSERT carrying the payload and both timestamp columns from the
    // same clock read; embedded fields and columns cannot diverge.
    async fn persist_new(&self, id: &str, mut doc: Document) -> Result<Document, DbError> {
        let now = Utc::now();
        let created_at = document::sync_timestamp(&mut doc, document::CREATED_AT_FIELD, now);
        let updated_at = document::sync_timestamp(&mut doc, document::UPDATED_AT_FIELD, now);
        let sql = format!(
            "INSERT INTO {} (id, doc, created_at, updated_at) VALUES ($1, $2, $3, $4)",
            self.table()
        );
        log::debug!("insert on {}: {sql}", self.name);
        let params = vec![
            SqlValue::Text(id.to_string()),
            SqlValue::Json(Value::Object(doc.clone())),
            SqlValue::Timestamp(created_at),
            SqlValue::Timestamp(updated_at),
        ];
        self.executor.execute(&sql, &params).await?;
        Ok(doc)
    }

    /// Applies `$set` to the first matching document in a single statement;
    /// there is no read-then-write window. Reports 0/0 or 1/1, never
    /// "matched but not modified".
    ///
    /// # Errors
    /// Surfaces filter/update parsing and executor failures unchanged.
    pub async fn update_one(
        &self,
        filter_doc: &Value,
        update_doc: &Value,
    ) -> Result<UpdateReport, DbError> {
        let spec = update::parse(update_doc)?;
        let now = Utc::now();
        let patch = update::set_patch(&spec, now);
        let compiled = filter::compile(filter_doc, 3)?;
        let sql = format!(
            "UPDATE {t} AS t SET doc = t.doc || $1, updated_at = $2 \
             FROM (SELECT id FROM {t}{w} LIMIT 1 FOR UPDATE) AS prev \
             WHERE t.id = prev.id",
            t = self.table(),
            w = compiled.where_sql(),
        );
        log::debug!("update_one on {}: {sql}", self.name);
        let mut params = vec![SqlValue::Json(Value::Object(patch)), SqlValue::Timestamp(now)];
        params.extend(compiled.params.iter().cloned());
        let affected = self.executor.execute(&sql, &params).await?;
        Ok(UpdateReport { matched: affected, modified: affected })
    }

    /// As `update_one`, but returns a document snapshot. For a match, the
    /// pre- or post-update state per `options.return_document`, read out of
    /// the same single statement. With `upsert` and no match, a new document
    /// is synthesized from `$setOnInsert` and `$set` and inserted; the
    /// pre-update snapshot of a fresh insert does not exist, hence `None`.
    ///
    /// # Errors
    /// Surfaces filter/update parsing and executor failures unchanged.
    pub async fn find_one_and_update(
        &self,
        filter_doc: &Value,
        update_doc: &Value,
        options: &FindOneAndUpdateOptions,
    ) -> Result<Option<Document>, DbError> {
        let spec = update::parse(update_doc)?;
        let now = Utc::now();
        let patch = update::set_patch(&spec, now);
        let compiled = filter::compile(filter_doc, 3)?;
        let returning = match options.return_document {
            ReturnDocument::After => "t.id, t.doc, t.created_at, t.updated_at",
            ReturnDocument::Before => "prev.id, prev.doc, prev.created_at, prev.updated_at",
        };
        let sql = format!(
            "UPDATE {t} AS t SET doc = t.doc || $1, updated_at = $2 \
             FROM (SELECT {DOC_COLUMNS} FROM {t}{w} LIMIT 1 FOR UPDATE) AS prev \
             WHERE t.id = prev.id RETURNING {returning}",
            t = self.table(),
            w = compiled.where_sql(),
        );
        log::debug!("find_one_and_update on {}: {sql}", self.name);
        let mut params = vec![SqlValue::Json(Value::Object(patch)), SqlValue::Timestamp(now)];
        params.extend(compiled.params.iter().cloned());
        let rows = self.executor.fetch_rows(&sql, &params).await?;
        if let Some(row) = rows.into_iter().next() {
            return Ok(Some(document::from_row(row)?));
        }
        if !options.upsert {
            return Ok(None);
        }
        let mut doc = update::apply_insert(&spec, now);
        let id = document::new_document_id();
        doc.insert(document::ID_FIELD.to_string(), Value::String(id.clone()));
        let doc = self.persist_new(&id, doc).await?;
        Ok(match options.return_document {
            ReturnDocument::After => Some(doc),
            ReturnDocument::Before => None,
        })
    }

    /// Deletes the first matching document in a single statement.
    ///
    /// # Errors
    /// Surfaces filter-compilation and executor failures unchanged.
    pub async fn delete_one(&self, filter_doc: &Value) -> Result<DeleteReport, DbError> {
        let compiled = filter::compile(filter_doc, 1)?;
        let sql = format!(
            "DELETE FROM {t} WHERE id IN (SELECT id FROM {t}{w} LIMIT 1)",
            t = self.table(),
            w = compiled.where_sql(),
        );
        log::debug!("delete_one on {}: {sql}", self.name);
        let deleted = self.executor.execute(&sql, &compiled.params).await?;
        Ok(DeleteReport { deleted })
    }

    /// Deletes every matching document. An empty compiled filter is refused
    /// and reported as zero deletions, so a full-table wipe can never ride
    /// on an accidentally-empty filter. The guard is not configurable.
    ///
    /// # Errors
    /// Surfaces filter-compilation and executor failures unchanged.
    pub async fn delete_many(&self, filter_doc: &Value) -> Result<DeleteReport, DbError> {
        let compiled = filter::compile(filter_doc, 1)?;
        if compiled.is_empty() {
            log::warn!(
                "delete_many on {} refused: empty filter would delete the whole table",
                self.name
            );
            return Ok(DeleteReport { deleted: 0 });
        }
        let sql = format!("DELETE FROM {}{}", self.table(), compiled.where_sql());
        log::debug!("delete_many on {}: {sql}", self.name);
        let deleted = self.executor.execute(&sql, &compiled.params).await?;
        Ok(DeleteReport { deleted })
    }
}
