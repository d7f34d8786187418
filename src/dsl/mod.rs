pub mod error;
pub mod handlers;

pub use error::DslError;

use crate::core::dataset::Dataset;
use crate::core::schema::TableSet;
use crate::core::value::Row;
use crate::engine::Sandbox;
use crate::query::QueryResult;
use crate::utils::parsing::bracket_balance;
use handlers::{handle_query, handle_save, handle_schema, handle_show, is_schema_statement};
use serde::Serialize;
use std::fmt;

/// Caller side of the sandbox: owns the declared tables and the dataset that
/// every statement runs against, and applies creation payloads to it.
pub struct Session {
    sandbox: Sandbox,
    tables: TableSet,
    dataset: Dataset,
}

impl Session {
    pub fn new(sandbox: Sandbox) -> Self {
        Self::with_dataset(sandbox, Dataset::new())
    }

    pub fn with_dataset(sandbox: Sandbox, dataset: Dataset) -> Self {
        Self {
            sandbox,
            tables: TableSet::new(),
            dataset,
        }
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    pub fn tables(&self) -> &TableSet {
        &self.tables
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Merge declared tables; each table new to the dataset starts empty.
    pub fn declare(&mut self, tables: TableSet) {
        for name in tables.table_names() {
            self.dataset.ensure_table(name);
        }
        self.tables.extend(tables);
    }

    pub(crate) fn dataset_mut(&mut self) -> &mut Dataset {
        &mut self.dataset
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DslOutput {
    None,
    Message(String),
    Tables(TableSet),
    Rows { table: String, rows: Vec<Row> },
    Result(QueryResult),
}

impl fmt::Display for DslOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DslOutput::None => Ok(()),
            DslOutput::Message(s) => write!(f, "{}", s),
            DslOutput::Tables(tables) => {
                for (name, columns) in tables.iter() {
                    writeln!(f, "Table: {} (columns: {})", name, columns.len())?;
                    for column in columns {
                        write!(f, "  - {}: {}", column.name, column.column_type)?;
                        if let Some(len) = column.max_length {
                            write!(f, "({})", len)?;
                        }
                        if column.auto_increment {
                            write!(f, " auto_increment")?;
                        }
                        if column.auto_fill {
                            write!(f, " auto_fill")?;
                        }
                        if column.nullable {
                            write!(f, " nullable")?;
                        }
                        if column.unique {
                            write!(f, " unique")?;
                        }
                        if let Some(default) = column.default_value() {
                            write!(f, " default={}", default)?;
                        }
                        writeln!(f)?;
                    }
                }
                Ok(())
            }
            DslOutput::Rows { table, rows } => {
                writeln!(f, "{} (rows: {})", table, rows.len())?;
                for row in rows {
                    writeln!(f, "  {}", serde_json::to_string(row).map_err(|_| fmt::Error)?)?;
                }
                Ok(())
            }
            DslOutput::Result(result) => write!(
                f,
                "{}",
                serde_json::to_string_pretty(result).map_err(|_| fmt::Error)?
            ),
        }
    }
}

/// Run a whole script, returning the output of every statement.
pub fn execute_script(session: &mut Session, script: &str) -> Result<Vec<DslOutput>, DslError> {
    let mut outputs = Vec::new();
    execute_script_with(session, script, |output| outputs.push(output))?;
    Ok(outputs)
}

/// Run a whole script, handing each statement's output to `on_output` as
/// soon as it is produced.
///
/// A statement may span lines; it ends on the line where parentheses,
/// brackets and braces balance. `#` and `//` lines between statements are
/// comments.
pub fn execute_script_with<F>(session: &mut Session, script: &str, mut on_output: F) -> Result<(), DslError>
where
    F: FnMut(DslOutput),
{
    let mut current_cmd = String::new();
    let mut start_line = 0;
    let mut balance = 0;

    for (idx, raw_line) in script.lines().enumerate() {
        let line = raw_line.trim();

        if current_cmd.is_empty() {
            if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
                continue;
            }
            start_line = idx + 1;
        } else {
            current_cmd.push('\n');
        }
        current_cmd.push_str(line);
        balance += bracket_balance(line);

        if balance <= 0 {
            let output = execute_line(session, &current_cmd, start_line)?;
            if !matches!(output, DslOutput::None) {
                on_output(output);
            }
            current_cmd.clear();
            balance = 0;
        }
    }

    if !current_cmd.is_empty() {
        return Err(DslError::Parse {
            line: start_line,
            msg: "Unexpected end of script (unbalanced brackets)".into(),
        });
    }

    Ok(())
}

/// Run one complete statement.
pub fn execute_line(session: &mut Session, line: &str, line_no: usize) -> Result<DslOutput, DslError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
        return Ok(DslOutput::None);
    }

    let upper = line.to_uppercase();
    if upper.starts_with("SHOW ") {
        handle_show(session, line, line_no)
    } else if upper.starts_with("SAVE ") {
        handle_save(session, line, line_no)
    } else if is_schema_statement(line) {
        handle_schema(session, line, line_no)
    } else {
        handle_query(session, line, line_no)
    }
}
