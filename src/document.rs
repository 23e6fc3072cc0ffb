use crate::errors::DbError;
use crate::pool::DocRow;
use crate::types::DocumentId;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

/// A logical document: an ordered field map, self-contained with its own
/// identity and timestamp fields alongside the application data.
pub type Document = Map<String, Value>;

pub const ID_FIELD: &str = "_id";
pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";

#[must_use]
pub fn new_document_id() -> DocumentId {
    uuid::Uuid::new_v4().to_string()
}

/// Maps a timestamp field (either spelling) to the physical column backing it.
/// Returns `None` for every other field, which lives inside the JSONB payload.
#[must_use]
pub fn timestamp_column(field: &str) -> Option<&'static str> {
    match field {
        CREATED_AT_FIELD | "createdAt" => Some("created_at"),
        UPDATED_AT_FIELD | "updatedAt" => Some("updated_at"),
        _ => None,
    }
}

#[must_use]
pub fn is_identity_field(field: &str) -> bool {
    field == ID_FIELD || field == "id"
}

#[must_use]
pub fn to_rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Accepts RFC 3339 strings and epoch-millisecond numbers.
#[must_use]
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s).ok().map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

/// String form of a scalar, as compared against `doc->>'field'` projections.
#[must_use]
pub fn scalar_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Reads an embedded timestamp field, restamping it with `fallback` when
/// missing or unparseable, and returns the value the physical column must
/// carry. Keeps the column and the embedded field from diverging.
pub fn sync_timestamp(
    doc: &mut Document,
    field: &'static str,
    fallback: DateTime<Utc>,
) -> DateTime<Utc> {
    match doc.get(field).and_then(parse_timestamp) {
        Some(ts) => ts,
        None => {
            doc.insert(field.to_string(), Value::String(to_rfc3339(fallback)));
            fallback
        }
    }
}

/// Rehydrates a physical row into a logical document.
///
/// Payload fields take precedence; identity and timestamps are back-filled
/// from the row's columns only when absent from the payload.
///
/// # Errors
/// Returns `DbError::InvalidDocument` if the stored payload is not an object.
pub fn from_row(row: DocRow) -> Result<Document, DbError> {
    let Value::Object(mut doc) = row.doc else {
        return Err(DbError::InvalidDocument(format!(
            "row {} holds a non-object payload",
            row.id
        )));
    };
    if !doc.contains_key(ID_FIELD) {
        doc.insert(ID_FIELD.to_string(), Value::String(row.id));
    }
    if !doc.contains_key(CREATED_AT_FIELD) {
        doc.insert(CREATED_AT_FIELD.to_string(), Value::String(to_rfc3339(row.created_at)));
    }
    if !doc.contains_key(UPDATED_AT_FIELD) {
        doc.insert(UPDATED_AT_FIELD.to_string(), Value::String(to_rfc3339(row.updated_at)));
    }
    Ok(doc)
}
