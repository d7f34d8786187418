use crate::core::value::{normalize, Row, Value};
use crate::utils::parsing::{split_top_level, strip_quotes};
use regex::RegexBuilder;
use serde::Serialize;
use std::fmt;

/// Comparison operator of a `where(...)` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Operator {
    Eq,
    Gt,
    Lt,
    Gte,
    Lte,
    Like,
    /// Anything else. Never matches.
    Unsupported(String),
}

impl Operator {
    pub fn parse(text: &str) -> Self {
        match strip_quotes(text) {
            "=" | "==" => Operator::Eq,
            ">" => Operator::Gt,
            "<" => Operator::Lt,
            ">=" => Operator::Gte,
            "<=" => Operator::Lte,
            op if op.eq_ignore_ascii_case("like") => Operator::Like,
            op => Operator::Unsupported(op.to_string()),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Eq => write!(f, "="),
            Operator::Gt => write!(f, ">"),
            Operator::Lt => write!(f, "<"),
            Operator::Gte => write!(f, ">="),
            Operator::Lte => write!(f, "<="),
            Operator::Like => write!(f, "like"),
            Operator::Unsupported(op) => write!(f, "{}", op),
        }
    }
}

/// One `column operator value` predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub column: String,
    pub operator: Operator,
    pub value: Value,
}

impl Condition {
    pub fn new(column: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    /// Build a condition from the argument text of a `where(...)` call.
    ///
    /// Two arguments imply `=`; three carry an explicit operator. Any other
    /// arity is not a condition.
    pub fn from_where_args(args: &str) -> Option<Self> {
        let parts = split_top_level(args);
        let (column, operator, value) = match parts.as_slice() {
            [column, value] => (column, Operator::Eq, value),
            [column, operator, value] => (column, Operator::parse(operator), value),
            _ => return None,
        };
        let column = strip_quotes(column);
        if column.is_empty() {
            return None;
        }
        Some(Self::new(column, operator, strip_quotes(value)))
    }

    pub fn matches(&self, row: &Row) -> bool {
        check_condition(row, self)
    }
}

/// Evaluate one condition against one row.
///
/// A missing or null cell never matches.
pub fn check_condition(row: &Row, condition: &Condition) -> bool {
    let cell = match row.get(&condition.column) {
        Some(v) if !v.is_null() => v,
        _ => return false,
    };

    let left = normalize(cell);
    let right = normalize(&condition.value);

    match &condition.operator {
        Operator::Eq => values_equal(&left, &right),
        Operator::Gt => compare_numbers(&left, &right, |a, b| a > b),
        Operator::Lt => compare_numbers(&left, &right, |a, b| a < b),
        Operator::Gte => compare_numbers(&left, &right, |a, b| a >= b),
        Operator::Lte => compare_numbers(&left, &right, |a, b| a <= b),
        Operator::Like => like_match(&cell.as_key(), &condition.value.as_key()),
        Operator::Unsupported(_) => false,
    }
}

/// True when every condition holds.
pub fn matches_all(row: &Row, conditions: &[Condition]) -> bool {
    conditions.iter().all(|c| check_condition(row, c))
}

/// Keep rows satisfying every condition, in their original order.
pub fn filter_rows(rows: &[Row], conditions: &[Condition]) -> Vec<Row> {
    rows.iter()
        .filter(|row| matches_all(row, conditions))
        .cloned()
        .collect()
}

fn compare_numbers(left: &Value, right: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

/// Equality on already-normalized values.
fn values_equal(left: &Value, right: &Value) -> bool {
    if matches!(left, Value::Bool(_)) || matches!(right, Value::Bool(_)) {
        return truthy(left) == truthy(right);
    }
    if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
        return a == b;
    }
    if let (Value::String(a), Value::String(b)) = (left, right) {
        return a.trim().to_lowercase() == b.trim().to_lowercase();
    }
    left == right
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::List(items) => !items.is_empty(),
        Value::Record(_) => true,
    }
}

/// `%` matches any run of characters; everything else is literal.
/// Case-insensitive and unanchored, so the pattern may match anywhere.
pub fn like_match(text: &str, pattern: &str) -> bool {
    let translated = pattern
        .split('%')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    RegexBuilder::new(&translated)
        .case_insensitive(true)
        .build()
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}
