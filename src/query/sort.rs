use super::filter::text_projection;
use crate::document;
use serde_json::Value;

/// Compiles a single-key sort specification into an `ORDER BY` fragment.
///
/// Timestamp aliases sort on their physical columns; every other key sorts
/// on the textual projection of the field. Direction `-1` is descending,
/// anything else ascending. Multi-key sort is not supported: only the first
/// entry is honored. An empty specification produces no fragment, leaving
/// row order to the engine.
#[must_use]
pub fn compile(sort: &Value) -> Option<String> {
    let map = sort.as_object()?;
    let (field, direction) = map.iter().next()?;
    let target = match document::timestamp_column(field) {
        Some(column) => column.to_string(),
        None => text_projection(field),
    };
    let order = if direction.as_i64() == Some(-1) { "DESC" } else { "ASC" };
    Some(format!("ORDER BY {target} {order}"))
}
