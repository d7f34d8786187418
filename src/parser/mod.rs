//! Migration text to [`TableSet`].
//!
//! Two strategies, tried in order with the first non-empty result winning for
//! the whole script: Laravel `Schema::create` blocks, then plain SQL
//! `CREATE TABLE`. Parsing is total; text that matches neither yields an
//! empty set.

pub mod blueprint;
pub mod sql;

pub use blueprint::BlueprintParser;
pub use sql::SqlParser;

use crate::core::schema::TableSet;

#[derive(Default)]
pub struct SchemaParser {
    blueprint: BlueprintParser,
    sql: SqlParser,
}

impl SchemaParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&self, text: &str) -> TableSet {
        let tables = self.blueprint.parse(text);
        if !tables.is_empty() {
            tracing::debug!(tables = tables.len(), "parsed Schema::create blocks");
            return tables;
        }
        let tables = self.sql.parse(text);
        tracing::debug!(tables = tables.len(), "parsed CREATE TABLE statements");
        tables
    }
}

/// Parse with a throwaway [`SchemaParser`].
pub fn parse_schema(text: &str) -> TableSet {
    SchemaParser::new().parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blueprint_wins_over_sql() {
        let text = r#"
Schema::create('users', function (Blueprint $table) {
    $table->id();
});

CREATE TABLE logs (id INT);
"#;
        let tables = parse_schema(text);
        assert_eq!(tables.table_names().collect::<Vec<_>>(), vec!["users"]);
    }

    #[test]
    fn test_sql_fallback() {
        let tables = parse_schema("CREATE TABLE logs (id INT, message TEXT);");
        assert_eq!(tables.columns("logs").unwrap().len(), 2);
    }

    #[test]
    fn test_garbage_is_empty() {
        assert!(parse_schema("hello world").is_empty());
        assert!(parse_schema("").is_empty());
    }
}
