// src/core/schema.rs

use super::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column type as declared in a migration.
///
/// The SQL fallback keeps whatever type word it finds, lowercased, in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    BigInt,
    String,
    Text,
    Integer,
    Boolean,
    Decimal,
    Timestamp,
    ForeignId,
    Other(String),
}

impl ColumnType {
    pub fn as_str(&self) -> &str {
        match self {
            ColumnType::BigInt => "bigint",
            ColumnType::String => "string",
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Boolean => "boolean",
            ColumnType::Decimal => "decimal",
            ColumnType::Timestamp => "timestamp",
            ColumnType::ForeignId => "foreignId",
            ColumnType::Other(s) => s,
        }
    }
}

impl From<String> for ColumnType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "bigint" => ColumnType::BigInt,
            "string" => ColumnType::String,
            "text" => ColumnType::Text,
            "integer" => ColumnType::Integer,
            "boolean" => ColumnType::Boolean,
            "decimal" => ColumnType::Decimal,
            "timestamp" => ColumnType::Timestamp,
            "foreignId" => ColumnType::ForeignId,
            _ => ColumnType::Other(s),
        }
    }
}

impl From<ColumnType> for String {
    fn from(t: ColumnType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// One column of a table, as produced by the schema parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_increment: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_fill: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            max_length: None,
            precision: None,
            scale: None,
            auto_increment: false,
            auto_fill: false,
            nullable: false,
            unique: false,
            default: None,
        }
    }

    /// The `id` primary key column.
    pub fn id() -> Self {
        let mut col = Self::new("id", ColumnType::BigInt);
        col.auto_increment = true;
        col
    }

    pub fn auto_filled(mut self) -> Self {
        self.auto_fill = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Default value, treating an explicit JSON `null` as no default.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref().filter(|v| !v.is_null())
    }

    pub fn is_auto_increment_id(&self) -> bool {
        self.name == "id" && self.auto_increment
    }
}

/// Table name to ordered column list, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableSet {
    tables: IndexMap<String, Vec<ColumnDefinition>>,
}

impl TableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a table; re-declaring a name replaces its columns in place.
    pub fn insert(&mut self, name: impl Into<String>, columns: Vec<ColumnDefinition>) {
        self.tables.insert(name.into(), columns);
    }

    pub fn columns(&self, name: &str) -> Option<&[ColumnDefinition]> {
        self.tables.get(name).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ColumnDefinition])> {
        self.tables
            .iter()
            .map(|(name, cols)| (name.as_str(), cols.as_slice()))
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Merge another set into this one; tables in `other` win.
    pub fn extend(&mut self, other: TableSet) {
        self.tables.extend(other.tables);
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_json_omits_unset_fields() {
        let col = ColumnDefinition::new("email", ColumnType::String)
            .with_max_length(100)
            .unique();
        let json = serde_json::to_value(&col).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "email", "type": "string", "maxLength": 100, "unique": true})
        );
    }

    #[test]
    fn test_column_json_defaults_on_read() {
        let col: ColumnDefinition =
            serde_json::from_str(r#"{"name": "id", "type": "bigint", "autoIncrement": true}"#)
                .unwrap();
        assert!(col.is_auto_increment_id());
        assert!(!col.nullable);
        assert_eq!(col.column_type, ColumnType::BigInt);

        let col: ColumnDefinition =
            serde_json::from_str(r#"{"name": "code", "type": "varchar"}"#).unwrap();
        assert_eq!(col.column_type, ColumnType::Other("varchar".into()));
    }

    #[test]
    fn test_redeclare_keeps_position() {
        let mut set = TableSet::new();
        set.insert("a", vec![]);
        set.insert("b", vec![]);
        set.insert("a", vec![ColumnDefinition::id()]);
        assert_eq!(set.table_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(set.columns("a").unwrap().len(), 1);
    }
}
