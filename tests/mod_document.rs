mod common;

use common::{row, ts};
use docrel::document::{
    self, CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD, from_row, new_document_id,
    parse_timestamp, scalar_to_text, sync_timestamp, timestamp_column,
};
use docrel::errors::DbError;
use serde_json::{Value, json};

#[test]
fn from_row_backfills_identity_and_timestamps() {
    let doc = from_row(row(
        "id-1",
        json!({"name": "Acme"}),
        "2024-05-01T00:00:00Z",
        "2024-05-02T00:00:00Z",
    ))
    .unwrap();
    assert_eq!(doc.get(ID_FIELD), Some(&json!("id-1")));
    assert_eq!(doc.get(CREATED_AT_FIELD), Some(&json!("2024-05-01T00:00:00.000Z")));
    assert_eq!(doc.get(UPDATED_AT_FIELD), Some(&json!("2024-05-02T00:00:00.000Z")));
}

#[test]
fn from_row_prefers_payload_fields() {
    let doc = from_row(row(
        "row-id",
        json!({"_id": "doc-id", "created_at": "1999-01-01T00:00:00Z", "name": "Acme"}),
        "2024-05-01T00:00:00Z",
        "2024-05-02T00:00:00Z",
    ))
    .unwrap();
    assert_eq!(doc.get(ID_FIELD), Some(&json!("doc-id")));
    assert_eq!(doc.get(CREATED_AT_FIELD), Some(&json!("1999-01-01T00:00:00Z")));
    // updated_at was absent from the payload, so the column fills it.
    assert_eq!(doc.get(UPDATED_AT_FIELD), Some(&json!("2024-05-02T00:00:00.000Z")));
}

#[test]
fn from_row_rejects_non_object_payload() {
    let err =
        from_row(row("id-1", json!([1, 2]), "2024-05-01T00:00:00Z", "2024-05-01T00:00:00Z"))
            .unwrap_err();
    assert!(matches!(err, DbError::InvalidDocument(_)));
}

#[test]
fn scalar_coercion_to_text() {
    assert_eq!(scalar_to_text(&json!("x")).as_deref(), Some("x"));
    assert_eq!(scalar_to_text(&json!(30)).as_deref(), Some("30"));
    assert_eq!(scalar_to_text(&json!(true)).as_deref(), Some("true"));
    assert_eq!(scalar_to_text(&json!(null)), None);
    assert_eq!(scalar_to_text(&json!({"a": 1})), None);
    assert_eq!(scalar_to_text(&json!([1])), None);
}

#[test]
fn timestamp_parsing_accepts_rfc3339_and_epoch_millis() {
    assert_eq!(
        parse_timestamp(&json!("2024-05-01T00:00:00Z")),
        Some(ts("2024-05-01T00:00:00Z"))
    );
    assert_eq!(parse_timestamp(&json!(1_714_521_600_000_i64)), Some(ts("2024-05-01T00:00:00Z")));
    assert_eq!(parse_timestamp(&json!("yesterday")), None);
    assert_eq!(parse_timestamp(&json!(true)), None);
}

#[test]
fn timestamp_column_covers_both_spellings() {
    assert_eq!(timestamp_column("createdAt"), Some("created_at"));
    assert_eq!(timestamp_column("created_at"), Some("created_at"));
    assert_eq!(timestamp_column("updatedAt"), Some("updated_at"));
    assert_eq!(timestamp_column("updated_at"), Some("updated_at"));
    assert_eq!(timestamp_column("name"), None);
}

#[test]
fn sync_timestamp_honors_parseable_and_restamps_garbage() {
    let fallback = ts("2024-05-01T12:00:00Z");

    let mut doc = match json!({"created_at": "2020-01-01T00:00:00Z"}) {
        Value::Object(m) => m,
        _ => unreachable!(),
    };
    let got = sync_timestamp(&mut doc, CREATED_AT_FIELD, fallback);
    assert_eq!(got, ts("2020-01-01T00:00:00Z"));
    assert_eq!(doc.get(CREATED_AT_FIELD), Some(&json!("2020-01-01T00:00:00Z")));

    let mut doc = match json!({"created_at": "not a date"}) {
        Value::Object(m) => m,
        _ => unreachable!(),
    };
    let got = sync_timestamp(&mut doc, CREATED_AT_FIELD, fallback);
    assert_eq!(got, fallback);
    assert_eq!(doc.get(CREATED_AT_FIELD), Some(&json!(document::to_rfc3339(fallback))));
}

#[test]
fn document_ids_are_unique_uuids() {
    let a = new_document_id();
    let b = new_document_id();
    assert_ne!(a, b);
    assert_eq!(a.len(), 36);
}
