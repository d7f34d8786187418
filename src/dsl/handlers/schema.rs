use crate::dsl::{DslError, DslOutput, Session};

pub fn is_schema_statement(line: &str) -> bool {
    line.contains("Schema::create") || line.to_uppercase().starts_with("CREATE TABLE")
}

/// Schema::create('t', function (Blueprint $table) { ... });
/// CREATE TABLE t ( ... );
pub fn handle_schema(session: &mut Session, line: &str, line_no: usize) -> Result<DslOutput, DslError> {
    let tables = session.sandbox().parse_schema(line);
    if tables.is_empty() {
        return Err(DslError::Parse {
            line: line_no,
            msg: "Unrecognized table declaration".into(),
        });
    }
    session.declare(tables.clone());
    Ok(DslOutput::Tables(tables))
}
