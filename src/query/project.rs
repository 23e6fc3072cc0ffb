use crate::document::Document;
use serde_json::Value;

/// A parsed projection. Any truthy entry switches the whole spec into
/// inclusion mode; exclusion only applies when no field is included.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Include(Vec<String>),
    Exclude(Vec<String>),
}

/// Parses a projection object (`{field: 1}` inclusion, `{field: 0}`
/// exclusion). Returns `None` when the spec is not an object or is empty.
#[must_use]
pub fn parse(spec: &Value) -> Option<Projection> {
    let map = spec.as_object()?;
    if map.is_empty() {
        return None;
    }
    let mut include = Vec::new();
    let mut exclude = Vec::new();
    for (field, flag) in map {
        if truthy(flag) {
            include.push(field.clone());
        } else {
            exclude.push(field.clone());
        }
    }
    if include.is_empty() { Some(Projection::Exclude(exclude)) } else { Some(Projection::Include(include)) }
}

fn truthy(flag: &Value) -> bool {
    match flag {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

/// Applies a projection, preserving the document's own field order.
/// Inclusion mode returns only the named fields; identity survives only
/// when named explicitly.
#[must_use]
pub fn apply(doc: Document, spec: &Value) -> Document {
    match parse(spec) {
        Some(Projection::Include(fields)) => {
            doc.into_iter().filter(|(k, _)| fields.iter().any(|f| f == k)).collect()
        }
        Some(Projection::Exclude(fields)) => {
            doc.into_iter().filter(|(k, _)| !fields.iter().any(|f| f == k)).collect()
        }
        None => doc,
    }
}
