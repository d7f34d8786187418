use crate::core::value::Row;
use crate::dsl::{DslError, DslOutput, Session};

/// SAVE <table> [{"name": "..."}, ...]
///
/// Runs autofill and validation against the declared columns, then replaces
/// the table's rows. Nothing is stored when any row fails.
pub fn handle_save(session: &mut Session, line: &str, line_no: usize) -> Result<DslOutput, DslError> {
    let rest = line.get(4..).unwrap_or("").trim();
    let (table, payload) = rest
        .split_once(char::is_whitespace)
        .map(|(t, p)| (t.trim(), p.trim()))
        .ok_or_else(|| DslError::Parse {
            line: line_no,
            msg: "Expected: SAVE <table> <json rows>".into(),
        })?;

    let rows: Vec<Row> = serde_json::from_str(payload).map_err(|e| DslError::Parse {
        line: line_no,
        msg: format!("Invalid row data: {}", e),
    })?;

    let columns = session.tables().columns(table).ok_or_else(|| DslError::Parse {
        line: line_no,
        msg: format!("Table not declared: {}", table),
    })?;

    let processed = session
        .sandbox()
        .process(&rows, columns)
        .map_err(|source| DslError::Validation {
            line: line_no,
            source,
        })?;

    let count = processed.len();
    session.dataset_mut().set_rows(table, processed);
    Ok(DslOutput::Message(format!("Saved {} rows to '{}'", count, table)))
}
