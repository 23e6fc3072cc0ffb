use crate::document::{self, Document};
use crate::errors::DbError;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// A parsed update specification: `$set` applies unconditionally, and
/// `$setOnInsert` only when an upsert inserts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSpec {
    pub set: Document,
    pub set_on_insert: Document,
}

/// Parses an update object. Only `$set` and `$setOnInsert` are supported;
/// anything else is rejected so callers cannot mistake "ignored" for
/// "applied".
///
/// # Errors
/// Returns `DbError::InvalidUpdate` on non-object input, non-object operator
/// arguments, or operators outside the supported pair.
pub fn parse(update: &Value) -> Result<UpdateSpec, DbError> {
    let Value::Object(map) = update else {
        return Err(DbError::InvalidUpdate("update must be an object".into()));
    };
    let mut spec = UpdateSpec::default();
    for (key, value) in map {
        let Value::Object(fields) = value else {
            return Err(DbError::InvalidUpdate(format!("{key} expects an object")));
        };
        match key.as_str() {
            "$set" => spec.set = fields.clone(),
            "$setOnInsert" => spec.set_on_insert = fields.clone(),
            other => {
                return Err(DbError::InvalidUpdate(format!(
                    "unsupported update operator `{other}`"
                )));
            }
        }
    }
    Ok(spec)
}

/// The flat patch a matched update merges into the stored payload: every
/// `$set` field (identity excluded, it is immutable after creation) plus
/// the `updated_at` stamp. Shaped for a JSONB `doc || $n` merge.
#[must_use]
pub fn set_patch(spec: &UpdateSpec, now: DateTime<Utc>) -> Document {
    let mut patch = Map::new();
    for (field, value) in &spec.set {
        if document::is_identity_field(field) {
            continue;
        }
        patch.insert(field.clone(), value.clone());
    }
    patch
        .insert(document::UPDATED_AT_FIELD.to_string(), Value::String(document::to_rfc3339(now)));
    patch
}

/// Merges `$set` onto the current document; `updated_at` is stamped last,
/// regardless of whether the caller set it.
#[must_use]
pub fn apply(mut current: Document, spec: &UpdateSpec, now: DateTime<Utc>) -> Document {
    for (field, value) in set_patch(spec, now) {
        current.insert(field, value);
    }
    current
}

/// Synthesizes the document an upsert inserts: `$setOnInsert` first (absent
/// keys only, so `$set` wins on conflict), then the `$set` merge, then a
/// `created_at` default. Identity is never written here; the façade mints it.
#[must_use]
pub fn apply_insert(spec: &UpdateSpec, now: DateTime<Utc>) -> Document {
    let mut doc = Map::new();
    for (field, value) in &spec.set_on_insert {
        if document::is_identity_field(field) || doc.contains_key(field) {
            continue;
        }
        doc.insert(field.clone(), value.clone());
    }
    let mut doc = apply(doc, spec, now);
    if !doc.contains_key(document::CREATED_AT_FIELD) {
        doc.insert(
            document::CREATED_AT_FIELD.to_string(),
            Value::String(document::to_rfc3339(now)),
        );
    }
    doc
}
