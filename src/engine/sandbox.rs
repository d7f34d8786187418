use super::autofill;
use super::error::{SandboxError, ValidationError};
use crate::core::config::SandboxConfig;
use crate::core::dataset::Dataset;
use crate::core::schema::{ColumnDefinition, TableSet};
use crate::core::value::Row;
use crate::parser::SchemaParser;
use crate::query::{Interpreter, QueryResult, RelationResolver};
use std::path::Path;

/// Entry point shared by the CLI, the script runner and the HTTP host.
///
/// Holds configuration and compiled patterns only; every call is a pure
/// function of its arguments, so one instance can serve concurrent callers.
pub struct Sandbox {
    config: SandboxConfig,
    parser: SchemaParser,
    interpreter: Interpreter,
}

impl Sandbox {
    pub fn new(config: SandboxConfig) -> Self {
        let resolver = RelationResolver::new(&config.relations);
        Self {
            parser: SchemaParser::new(),
            interpreter: Interpreter::new(resolver),
            config,
        }
    }

    /// Sandbox configured from an explicit TOML file; unlike
    /// [`SandboxConfig::load`] a missing file is an error here.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, SandboxError> {
        Ok(Self::new(SandboxConfig::load_from(path)?))
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    pub fn parse_schema(&self, text: &str) -> TableSet {
        self.parser.parse(text)
    }

    pub fn interpret(&self, query: &str, dataset: &Dataset) -> QueryResult {
        self.interpreter.interpret(query, dataset)
    }

    pub fn process(
        &self,
        rows: &[Row],
        columns: &[ColumnDefinition],
    ) -> Result<Vec<Row>, ValidationError> {
        autofill::process(rows, columns)
    }
}

/// Read a `{"table": [rows]}` JSON file into a [`Dataset`].
pub fn read_dataset(path: impl AsRef<Path>) -> Result<Dataset, SandboxError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new(SandboxConfig::default())
    }
}
