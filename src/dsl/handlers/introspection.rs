use crate::dsl::{DslError, DslOutput, Session};

/// SHOW TABLES
/// SHOW <table>
pub fn handle_show(session: &mut Session, line: &str, line_no: usize) -> Result<DslOutput, DslError> {
    let rest = line.get(4..).unwrap_or("").trim();

    if rest.eq_ignore_ascii_case("TABLES") {
        let mut names: Vec<&str> = session.tables().table_names().collect();
        for name in session.dataset().table_names() {
            if !names.contains(&name) {
                names.push(name);
            }
        }

        let mut output = String::from("--- TABLES ---\n");
        output.push_str(&format!("{:<24} {:<10} {:<10}\n", "Table", "Columns", "Rows"));
        output.push_str(&format!("{:-<44}\n", ""));
        for name in names {
            let columns = session.tables().columns(name).map_or(0, <[_]>::len);
            let rows = session.dataset().rows(name).len();
            output.push_str(&format!("{:<24} {:<10} {:<10}\n", name, columns, rows));
        }
        output.push_str("--------------");
        return Ok(DslOutput::Message(output));
    }

    if rest.is_empty() {
        return Err(DslError::Parse {
            line: line_no,
            msg: "Expected: SHOW TABLES or SHOW <table>".into(),
        });
    }

    if !session.dataset().contains_table(rest) && session.tables().columns(rest).is_none() {
        return Err(DslError::Parse {
            line: line_no,
            msg: format!("Table not found: {}", rest),
        });
    }

    Ok(DslOutput::Rows {
        table: rest.to_string(),
        rows: session.dataset().rows(rest).to_vec(),
    })
}
