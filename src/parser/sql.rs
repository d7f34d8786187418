//! Plain `CREATE TABLE name ( ... );` fallback.
//!
//! Only names and type words are kept; there is no attribute parsing.

use crate::core::schema::{ColumnDefinition, ColumnType, TableSet};
use regex::Regex;

/// Table-level clauses that do not declare a column. A clause keyword must be
/// followed by clause syntax; `key VARCHAR(20)` or `index INT` are columns.
const CLAUSE_PATTERN: &str = r"(?ix)^(?:
    FOREIGN \s+ KEY \b
  | CONSTRAINT \s+ (?:\w+ \s+)? (?:PRIMARY|FOREIGN|UNIQUE|CHECK) \b
  | PRIMARY \s+ KEY \s* \(
  | UNIQUE \b \s* (?:(?:KEY|INDEX) \b \s*)? (?:\w+ \s*)? \( \s* [a-z_]
  | (?:KEY|INDEX) \b \s* (?:\w+ \s*)? \( \s* [a-z_]
  | CHECK \s* \(
)";

pub struct SqlParser {
    table: Regex,
    column: Regex,
    clause: Regex,
}

impl SqlParser {
    pub fn new() -> Self {
        Self {
            table: Regex::new(r"(?is)CREATE\s+TABLE\s+(\w+)\s*\((.*?)\);")
                .expect("valid create table pattern"),
            column: Regex::new(r"(\w+)\s+(\w+)").expect("valid column pattern"),
            clause: Regex::new(CLAUSE_PATTERN).expect("valid clause pattern"),
        }
    }

    pub fn parse(&self, text: &str) -> TableSet {
        let mut tables = TableSet::new();
        for caps in self.table.captures_iter(text) {
            tables.insert(&caps[1], self.parse_columns(&caps[2]));
        }
        tables
    }

    /// Split on every comma (no paren awareness) and keep `name type` pairs.
    pub fn parse_columns(&self, columns: &str) -> Vec<ColumnDefinition> {
        columns
            .split(',')
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty() && !self.clause.is_match(fragment))
            .filter_map(|fragment| {
                self.column.captures(fragment).map(|caps| {
                    ColumnDefinition::new(&caps[1], ColumnType::from(caps[2].to_lowercase()))
                })
            })
            .collect()
    }
}

impl Default for SqlParser {
    fn default() -> Self {
        Self::new()
    }
}
