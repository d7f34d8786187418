//! Fills derived cells (ids, timestamps, defaults) and validates rows against
//! their table's columns. All-or-nothing: one bad row fails the whole batch.

use super::error::ValidationError;
use crate::core::dataset::max_numeric_id;
use crate::core::schema::{ColumnDefinition, ColumnType};
use crate::core::value::{timestamp_now, Row, Value};
use indexmap::IndexMap;

pub fn process(rows: &[Row], columns: &[ColumnDefinition]) -> Result<Vec<Row>, ValidationError> {
    let mut next_id = max_numeric_id(rows).saturating_add(1);
    let mut processed: Vec<Row> = Vec::with_capacity(rows.len());
    let mut errors: IndexMap<String, Vec<String>> = IndexMap::new();

    for (index, row) in rows.iter().enumerate() {
        let mut out = row.clone();
        let mut row_errors = Vec::new();

        for column in columns {
            let name = column.name.as_str();
            let value = match row.get(name) {
                Some(value) if !value.is_blank() => value,
                _ => {
                    if column.is_auto_increment_id() {
                        out.insert(name.to_string(), Value::Int(next_id));
                        next_id = next_id.saturating_add(1);
                    } else if column.auto_fill {
                        out.insert(name.to_string(), timestamp_now());
                    } else if let Some(default) = column.default_value() {
                        out.insert(name.to_string(), default.clone());
                    } else if !column.nullable {
                        row_errors.push(format!("Field '{}' is required", name));
                    }
                    continue;
                }
            };

            if column.column_type == ColumnType::String {
                if let Some(max) = column.max_length {
                    if text_length(value) > max {
                        row_errors.push(format!(
                            "Field '{}' exceeds maximum length of {} characters",
                            name, max
                        ));
                    }
                }
            }

            if column.unique && processed.iter().any(|earlier| earlier.get(name) == Some(value)) {
                row_errors.push(format!(
                    "Value '{}' in field '{}' must be unique",
                    value, name
                ));
            }
        }

        if !row_errors.is_empty() {
            errors.insert(format!("row_{}", index), row_errors);
        }
        processed.push(out);
    }

    if errors.is_empty() {
        Ok(processed)
    } else {
        tracing::warn!(rows = errors.len(), "row validation failed");
        Err(ValidationError {
            errors,
            rows: processed,
        })
    }
}

fn text_length(value: &Value) -> usize {
    match value {
        Value::String(s) => s.chars().count(),
        other => other.as_key().chars().count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_ids_continue_after_max() {
        let columns = vec![ColumnDefinition::id()];
        let rows = vec![
            row(&[("id", Value::Int(4))]),
            row(&[("id", Value::from(""))]),
            row(&[]),
        ];
        let out = process(&rows, &columns).unwrap();
        assert_eq!(out[0]["id"], Value::Int(4));
        assert_eq!(out[1]["id"], Value::Int(5));
        assert_eq!(out[2]["id"], Value::Int(6));
    }

    #[test]
    fn test_huge_ids_saturate() {
        let columns = vec![ColumnDefinition::id()];
        let rows = vec![
            row(&[("id", Value::from("1e30"))]),
            row(&[("id", Value::from(""))]),
            row(&[]),
        ];
        let out = process(&rows, &columns).unwrap();
        assert_eq!(out[1]["id"], Value::Int(i64::MAX));
        assert_eq!(out[2]["id"], Value::Int(i64::MAX));
    }

    #[test]
    fn test_defaults_and_autofill() {
        let columns = vec![
            ColumnDefinition::new("status", ColumnType::String).with_default(Value::from("draft")),
            ColumnDefinition::new("created_at", ColumnType::Timestamp).auto_filled(),
            ColumnDefinition::new("stock", ColumnType::Integer).with_default(Value::Int(7)),
        ];
        let out = process(&[row(&[("stock", Value::Int(0))])], &columns).unwrap();
        assert_eq!(out[0]["status"], Value::from("draft"));
        assert_eq!(out[0]["created_at"].as_str().map(str::len), Some(19));
        // 0 is a real value, not empty
        assert_eq!(out[0]["stock"], Value::Int(0));
    }

    #[test]
    fn test_required_nullable_and_length() {
        let columns = vec![
            ColumnDefinition::new("name", ColumnType::String).with_max_length(3),
            ColumnDefinition::new("note", ColumnType::Text).nullable(),
        ];
        let err = process(
            &[row(&[("name", Value::from("abcd"))]), row(&[])],
            &columns,
        )
        .unwrap_err();
        assert_eq!(
            err.messages_for(0),
            ["Field 'name' exceeds maximum length of 3 characters"]
        );
        assert_eq!(err.messages_for(1), ["Field 'name' is required"]);
        assert_eq!(err.rows.len(), 2);
    }

    #[test]
    fn test_unique_first_seen_wins() {
        let columns = vec![ColumnDefinition::new("sku", ColumnType::String).unique()];
        let err = process(
            &[
                row(&[("sku", Value::from("A"))]),
                row(&[("sku", Value::from("B"))]),
                row(&[("sku", Value::from("A"))]),
            ],
            &columns,
        )
        .unwrap_err();
        assert!(err.messages_for(0).is_empty());
        assert_eq!(
            err.messages_for(2),
            ["Value 'A' in field 'sku' must be unique"]
        );
        assert_eq!(
            err.to_string(),
            r#"validation failed: {"row_2":["Value 'A' in field 'sku' must be unique"]}"#
        );
    }
}
