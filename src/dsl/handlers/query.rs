use crate::dsl::{DslError, DslOutput, Session};
use crate::query::QueryResult;

/// Any other statement goes to the interpreter. Creation payloads are
/// appended to the session dataset, which is the caller's job.
pub fn handle_query(session: &mut Session, line: &str, _line_no: usize) -> Result<DslOutput, DslError> {
    let result = session.sandbox().interpret(line, session.dataset());
    if let QueryResult::Created(payload) = &result {
        session
            .dataset_mut()
            .push_row(&payload.table, payload.data.clone());
    }
    Ok(DslOutput::Result(result))
}
