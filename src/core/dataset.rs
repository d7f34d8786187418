// src/core/dataset.rs

use super::value::Row;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Snapshot of every table's rows, supplied wholesale by the caller.
///
/// Table order is the order the caller supplied; it matters for the fuzzy
/// relation-table lookup, which picks the first matching name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    tables: IndexMap<String, Vec<Row>>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows of `name`, or an empty slice when the table is absent.
    pub fn rows(&self, name: &str) -> &[Row] {
        self.tables.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Replace (or create) a table's rows. An existing table keeps its position.
    pub fn set_rows(&mut self, name: impl Into<String>, rows: Vec<Row>) {
        self.tables.insert(name.into(), rows);
    }

    /// Make sure a table exists without touching rows already present.
    pub fn ensure_table(&mut self, name: &str) {
        if !self.tables.contains_key(name) {
            self.tables.insert(name.to_string(), Vec::new());
        }
    }

    pub fn push_row(&mut self, name: &str, row: Row) {
        self.tables.entry(name.to_string()).or_default().push(row);
    }

    /// Largest numeric `id` in a table (0 when empty or absent).
    pub fn max_id(&self, name: &str) -> i64 {
        max_numeric_id(self.rows(name))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<(String, Vec<Row>)> for Dataset {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Row>)>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().collect(),
        }
    }
}

/// Largest numeric `id` across rows; non-numeric ids are ignored.
pub fn max_numeric_id(rows: &[Row]) -> i64 {
    rows.iter()
        .filter_map(|row| row.get("id").and_then(|v| v.numeric_id()))
        .fold(0, i64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;

    fn row(id: Value) -> Row {
        let mut r = Row::new();
        r.insert("id".into(), id);
        r
    }

    #[test]
    fn test_max_id_ignores_non_numeric() {
        let mut ds = Dataset::new();
        ds.set_rows(
            "products",
            vec![row(Value::Int(3)), row(Value::from("7")), row(Value::from("x"))],
        );
        assert_eq!(ds.max_id("products"), 7);
        assert_eq!(ds.max_id("missing"), 0);
    }

    #[test]
    fn test_json_shape() {
        let ds: Dataset =
            serde_json::from_str(r#"{"users": [{"id": 1}], "posts": []}"#).unwrap();
        assert_eq!(ds.table_names().collect::<Vec<_>>(), vec!["users", "posts"]);
        assert_eq!(ds.rows("users").len(), 1);
        assert!(ds.rows("nothing").is_empty());
    }
}
