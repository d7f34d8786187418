//! `Schema::create('table', function (Blueprint $table) { ... });` blocks.

use crate::core::schema::{ColumnDefinition, ColumnType, TableSet};
use crate::utils::parsing::parse_default_literal;
use regex::{Captures, Regex};

/// What a recognized column line turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Declaration {
    Id,
    Typed(ColumnType),
    Timestamps,
    SoftDeletes,
}

/// Tries each column recognizer in order; first match wins per line.
pub struct BlueprintParser {
    block: Regex,
    recognizers: Vec<(Regex, Declaration)>,
    default_modifier: Regex,
    unique_modifier: Regex,
    nullable_modifier: Regex,
}

impl BlueprintParser {
    pub fn new() -> Self {
        let re = |p: &str| Regex::new(p).expect("blueprint patterns are valid");
        let named = |method: &str| format!(r#"\$\w+->{}\(\s*['"](\w+)['"]\s*\)"#, method);

        let recognizers = vec![
            (
                re(r#"\$\w+->(?:id|increments|bigIncrements)\(\s*['"]?\w*['"]?\s*\)"#),
                Declaration::Id,
            ),
            (
                re(r#"\$\w+->string\(\s*['"](\w+)['"](?:\s*,\s*(\d+))?\s*\)"#),
                Declaration::Typed(ColumnType::String),
            ),
            (re(&named("text")), Declaration::Typed(ColumnType::Text)),
            (re(&named("integer")), Declaration::Typed(ColumnType::Integer)),
            (re(&named("bigInteger")), Declaration::Typed(ColumnType::BigInt)),
            (re(&named("boolean")), Declaration::Typed(ColumnType::Boolean)),
            (
                re(r#"\$\w+->decimal\(\s*['"](\w+)['"](?:\s*,\s*(\d+)\s*,\s*(\d+))?\s*\)"#),
                Declaration::Typed(ColumnType::Decimal),
            ),
            (re(&named("timestamp")), Declaration::Typed(ColumnType::Timestamp)),
            (re(r"\$\w+->timestamps\(\s*\)"), Declaration::Timestamps),
            (re(r"\$\w+->softDeletes\(\s*\)"), Declaration::SoftDeletes),
            (re(&named("foreignId")), Declaration::Typed(ColumnType::ForeignId)),
        ];

        Self {
            block: re(
                r#"(?s)Schema::create\s*\(\s*['"](\w+)['"]\s*,\s*function\s*\(\s*(?:Blueprint\s+)?\$\w+\s*\)\s*\{(.*?)\}\s*\)\s*;"#,
            ),
            recognizers,
            default_modifier: re(r"->default\(([^)]+)\)"),
            unique_modifier: re(r"->unique\(\s*\)"),
            nullable_modifier: re(r"->nullable\(\s*\)"),
        }
    }

    /// Every `Schema::create` block in `text`.
    pub fn parse(&self, text: &str) -> TableSet {
        let mut tables = TableSet::new();
        for caps in self.block.captures_iter(text) {
            tables.insert(&caps[1], self.parse_body(&caps[2]));
        }
        tables
    }

    /// Column list of one block body. Unrecognized lines are skipped.
    pub fn parse_body(&self, body: &str) -> Vec<ColumnDefinition> {
        let mut columns = Vec::new();
        for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some((caps, declaration)) = self.recognize(line) {
                columns.extend(self.columns_for(line, &caps, declaration));
            }
        }
        columns
    }

    fn recognize<'t>(&self, line: &'t str) -> Option<(Captures<'t>, Declaration)> {
        self.recognizers
            .iter()
            .find_map(|(pattern, declaration)| pattern.captures(line).map(|c| (c, declaration.clone())))
    }

    fn columns_for(&self, line: &str, caps: &Captures<'_>, declaration: Declaration) -> Vec<ColumnDefinition> {
        match declaration {
            Declaration::Id => vec![ColumnDefinition::id()],
            Declaration::Timestamps => vec![
                ColumnDefinition::new("created_at", ColumnType::Timestamp).auto_filled(),
                ColumnDefinition::new("updated_at", ColumnType::Timestamp).auto_filled(),
            ],
            Declaration::SoftDeletes => {
                vec![ColumnDefinition::new("deleted_at", ColumnType::Timestamp).nullable()]
            }
            Declaration::Typed(column_type) => {
                let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
                let mut column = ColumnDefinition::new(&caps[1], column_type.clone());
                match column_type {
                    ColumnType::String => column.max_length = number(2).map(|n| n as usize),
                    ColumnType::Decimal => {
                        column.precision = number(2);
                        column.scale = number(3);
                    }
                    _ => {}
                }
                vec![self.apply_modifiers(line, column)]
            }
        }
    }

    fn apply_modifiers(&self, line: &str, mut column: ColumnDefinition) -> ColumnDefinition {
        if let Some(caps) = self.default_modifier.captures(line) {
            column.default = Some(parse_default_literal(&caps[1]));
        }
        if self.unique_modifier.is_match(line) {
            column.unique = true;
        }
        if self.nullable_modifier.is_match(line) {
            column.nullable = true;
        }
        column
    }
}

impl Default for BlueprintParser {
    fn default() -> Self {
        Self::new()
    }
}
