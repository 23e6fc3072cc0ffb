use crate::document;
use crate::errors::DbError;
use crate::pool::SqlValue;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOp {
    Gte,
    Gt,
}

impl RangeOp {
    const fn sql(self) -> &'static str {
        match self {
            Self::Gte => ">=",
            Self::Gt => ">",
        }
    }
}

/// A filter object is parsed into this tagged union before any SQL is
/// assembled, so the operator set can be extended without touching string
/// rendering. Sibling expressions combine with AND.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// `_id`/`id` equality against the identity column.
    IdEq(String),
    /// `$gte`/`$gt` against a physical timestamp column.
    TimeRange { column: &'static str, op: RangeOp, bound: DateTime<Utc> },
    /// `$gte`/`$gt` against the textual projection of a payload field.
    TextRange { field: String, op: RangeOp, bound: String },
    /// `$ne` against the textual projection.
    Ne { field: String, value: String },
    /// `$in`: an OR-list of equalities. Empty renders FALSE, never "all".
    In { field: String, values: Vec<String> },
    /// `$regex`, reduced to case-insensitive substring containment.
    Contains { field: String, needle: String },
    /// Plain scalar equality against the textual projection.
    Eq { field: String, value: String },
    /// Top-level `$or`: branches of AND-ed expressions, joined with OR.
    Or(Vec<Vec<FilterExpr>>),
}

/// A rendered WHERE clause plus its positionally-ordered parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledFilter {
    pub clause: Option<String>,
    pub params: Vec<SqlValue>,
}

impl CompiledFilter {
    /// The ` WHERE …` fragment, or an empty string for a match-all filter.
    #[must_use]
    pub fn where_sql(&self) -> String {
        match &self.clause {
            Some(clause) => format!(" WHERE {clause}"),
            None => String::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clause.is_none()
    }
}

/// Compiles a filter object into a WHERE clause whose placeholders start at
/// `$first_placeholder`. Every literal travels through the parameter list;
/// only developer-supplied field names are interpolated.
///
/// # Errors
/// Returns `DbError::UnsupportedFilter` for operator shapes outside the
/// supported vocabulary, rather than silently widening the match.
pub fn compile(filter: &Value, first_placeholder: usize) -> Result<CompiledFilter, DbError> {
    let exprs = parse(filter)?;
    Ok(render(&exprs, first_placeholder))
}

/// Parses a filter object into the `FilterExpr` union.
///
/// # Errors
/// Returns `DbError::UnsupportedFilter` for unrecognized operator shapes.
pub fn parse(filter: &Value) -> Result<Vec<FilterExpr>, DbError> {
    match filter {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => parse_fields(map, true),
        other => {
            Err(DbError::UnsupportedFilter(format!("filter must be an object, got {other}")))
        }
    }
}

fn parse_fields(map: &Map<String, Value>, allow_or: bool) -> Result<Vec<FilterExpr>, DbError> {
    let mut out = Vec::new();
    for (field, value) in map {
        if field == "$or" {
            if !allow_or {
                return Err(DbError::UnsupportedFilter("$or cannot be nested inside $or".into()));
            }
            let Value::Array(subs) = value else {
                return Err(DbError::UnsupportedFilter("$or expects an array of filters".into()));
            };
            if subs.is_empty() {
                return Err(DbError::UnsupportedFilter("$or expects a non-empty array".into()));
            }
            let mut branches = Vec::with_capacity(subs.len());
            for sub in subs {
                let Value::Object(m) = sub else {
                    return Err(DbError::UnsupportedFilter(
                        "$or branches must be filter objects".into(),
                    ));
                };
                branches.push(parse_fields(m, false)?);
            }
            out.push(FilterExpr::Or(branches));
            continue;
        }
        if document::is_identity_field(field) {
            let Some(id) = document::scalar_to_text(value) else {
                return Err(DbError::UnsupportedFilter(
                    "identity filters accept scalar values only".into(),
                ));
            };
            out.push(FilterExpr::IdEq(id));
            continue;
        }
        match value {
            // A null value emits no clause for this field.
            Value::Null => {}
            Value::Object(ops) => out.push(parse_operator(field, ops)?),
            Value::String(s) => {
                out.push(FilterExpr::Eq { field: field.clone(), value: s.clone() });
            }
            Value::Number(n) => {
                out.push(FilterExpr::Eq { field: field.clone(), value: n.to_string() });
            }
            Value::Bool(b) => {
                out.push(FilterExpr::Eq { field: field.clone(), value: b.to_string() });
            }
            Value::Array(_) => {
                return Err(DbError::UnsupportedFilter(format!(
                    "array equality on `{field}` is not supported"
                )));
            }
        }
    }
    Ok(out)
}

// $gte is checked before $gt; only the first recognized operator of a
// sub-object is honored.
fn parse_operator(field: &str, ops: &Map<String, Value>) -> Result<FilterExpr, DbError> {
    if let Some(v) = ops.get("$gte") {
        return range_expr(field, RangeOp::Gte, v);
    }
    if let Some(v) = ops.get("$gt") {
        return range_expr(field, RangeOp::Gt, v);
    }
    if let Some(v) = ops.get("$ne") {
        let Some(value) = document::scalar_to_text(v) else {
            return Err(DbError::UnsupportedFilter(format!("$ne on `{field}` expects a scalar")));
        };
        return Ok(FilterExpr::Ne { field: field.to_string(), value });
    }
    if let Some(v) = ops.get("$in") {
        let Value::Array(items) = v else {
            return Err(DbError::UnsupportedFilter(format!("$in on `{field}` expects an array")));
        };
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            let Some(text) = document::scalar_to_text(item) else {
                return Err(DbError::UnsupportedFilter(format!(
                    "$in on `{field}` holds a non-scalar element"
                )));
            };
            values.push(text);
        }
        return Ok(FilterExpr::In { field: field.to_string(), values });
    }
    if let Some(v) = ops.get("$regex") {
        let Value::String(needle) = v else {
            return Err(DbError::UnsupportedFilter(format!(
                "$regex on `{field}` expects a string pattern"
            )));
        };
        return Ok(FilterExpr::Contains { field: field.to_string(), needle: needle.clone() });
    }
    let keys: Vec<&str> = ops.keys().map(String::as_str).collect();
    Err(DbError::UnsupportedFilter(format!(
        "unsupported operator shape on `{field}`: {{{}}}",
        keys.join(", ")
    )))
}

fn range_expr(field: &str, op: RangeOp, value: &Value) -> Result<FilterExpr, DbError> {
    if let Some(column) = document::timestamp_column(field) {
        let Some(bound) = document::parse_timestamp(value) else {
            return Err(DbError::UnsupportedFilter(format!(
                "range bound on `{field}` must be a timestamp"
            )));
        };
        return Ok(FilterExpr::TimeRange { column, op, bound });
    }
    let Some(bound) = document::scalar_to_text(value) else {
        return Err(DbError::UnsupportedFilter(format!(
            "range bound on `{field}` must be a scalar"
        )));
    };
    Ok(FilterExpr::TextRange { field: field.to_string(), op, bound })
}

/// Renders parsed expressions to SQL, numbering placeholders from
/// `first_placeholder`.
#[must_use]
pub fn render(exprs: &[FilterExpr], first_placeholder: usize) -> CompiledFilter {
    let mut params = Vec::new();
    let mut next = first_placeholder;
    let clauses: Vec<String> =
        exprs.iter().map(|e| render_expr(e, &mut params, &mut next)).collect();
    CompiledFilter {
        clause: if clauses.is_empty() { None } else { Some(clauses.join(" AND ")) },
        params,
    }
}

/// `doc->>'field'` with single quotes doubled. Field names are developer
/// supplied; the quoting closes accidental breakage, not an attack surface.
#[must_use]
pub(crate) fn text_projection(field: &str) -> String {
    format!("doc->>'{}'", field.replace('\'', "''"))
}

fn placeholder(params: &mut Vec<SqlValue>, next: &mut usize, value: SqlValue) -> String {
    params.push(value);
    let n = *next;
    *next += 1;
    format!("${n}")
}

fn render_expr(expr: &FilterExpr, params: &mut Vec<SqlValue>, next: &mut usize) -> String {
    match expr {
        FilterExpr::IdEq(id) => {
            let p = placeholder(params, next, SqlValue::Text(id.clone()));
            format!("id = {p}")
        }
        FilterExpr::TimeRange { column, op, bound } => {
            let p = placeholder(params, next, SqlValue::Timestamp(*bound));
            format!("{column} {} {p}", op.sql())
        }
        FilterExpr::TextRange { field, op, bound } => {
            let p = placeholder(params, next, SqlValue::Text(bound.clone()));
            format!("{} {} {p}", text_projection(field), op.sql())
        }
        FilterExpr::Ne { field, value } => {
            let p = placeholder(params, next, SqlValue::Text(value.clone()));
            format!("{} <> {p}", text_projection(field))
        }
        FilterExpr::In { field, values } => {
            if values.is_empty() {
                return "FALSE".to_string();
            }
            let proj = text_projection(field);
            let alts: Vec<String> = values
                .iter()
                .map(|v| {
                    let p = placeholder(params, next, SqlValue::Text(v.clone()));
                    format!("{proj} = {p}")
                })
                .collect();
            format!("({})", alts.join(" OR "))
        }
        FilterExpr::Contains { field, needle } => {
            let escaped = needle.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
            let p = placeholder(params, next, SqlValue::Text(format!("%{escaped}%")));
            format!("{} ILIKE {p}", text_projection(field))
        }
        FilterExpr::Eq { field, value } => {
            let p = placeholder(params, next, SqlValue::Text(value.clone()));
            format!("{} = {p}", text_projection(field))
        }
        FilterExpr::Or(branches) => {
            let rendered: Vec<String> = branches
                .iter()
                .map(|branch| {
                    let inner: Vec<String> =
                        branch.iter().map(|e| render_expr(e, params, next)).collect();
                    if inner.is_empty() {
                        "TRUE".to_string()
                    } else {
                        format!("({})", inner.join(" AND "))
                    }
                })
                .collect();
            format!("({})", rendered.join(" OR "))
        }
    }
}
