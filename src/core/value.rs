// src/core/value.rs

use crate::utils::parsing::is_numeric;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single record: column name to cell value, in insertion order.
pub type Row = IndexMap<String, Value>;

/// Format used for every generated timestamp (`created_at`, autofill columns).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Loosely typed cell value as it arrives from the caller.
///
/// Scalars cover what a table cell can hold. `List` and `Record` only show up
/// once relations have been attached to a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Record(Row),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Missing-value check used by autofill: null or a blank string.
    /// `0` and `false` are real values.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of a number value (strings are not parsed here).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Row> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Integer id of a numeric value or numeric text, truncating fractions.
    pub fn numeric_id(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Value::String(s) if is_numeric(s) => s.trim().parse::<f64>().ok().map(|f| f.trunc() as i64),
            _ => None,
        }
    }

    /// Text form used for key comparisons (`id` against `*_id`, `find(n)`).
    /// `1`, `1.0` and `"1"` all produce `"1"`.
    pub fn as_key(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(true) => "1".to_string(),
            Value::Bool(false) => String::new(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::String(s) => s.clone(),
            Value::List(_) | Value::Record(_) => serde_json::to_string(self).unwrap_or_default(),
        }
    }

    /// True when the value is an empty relation result (null or `[]`).
    pub fn is_empty_relation(&self) -> bool {
        match self {
            Value::Null => true,
            Value::List(items) => items.is_empty(),
            _ => false,
        }
    }
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

/// Coerce text literals so both sides of a comparison agree on type.
///
/// `"true"`/`"false"` become booleans, numbers and numeric text become
/// floats, everything else passes through.
pub fn normalize(value: &Value) -> Value {
    match value {
        Value::String(s) if s == "true" => Value::Bool(true),
        Value::String(s) if s == "false" => Value::Bool(false),
        Value::String(s) if is_numeric(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or_else(|_| value.clone()),
        Value::Int(i) => Value::Float(*i as f64),
        other => other.clone(),
    }
}

/// Current local time in [`TIMESTAMP_FORMAT`].
pub fn timestamp_now() -> Value {
    Value::String(chrono::Local::now().format(TIMESTAMP_FORMAT).to_string())
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Row> for Value {
    fn from(row: Row) -> Self {
        Value::Record(row)
    }
}

impl From<Vec<Row>> for Value {
    fn from(rows: Vec<Row>) -> Self {
        Value::List(rows.into_iter().map(Value::Record).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => write!(f, "[{} items]", items.len()),
            Value::Record(row) => write!(f, "{{{} fields}}", row.len()),
        }
    }
}
