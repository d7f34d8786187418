pub mod condition;
pub mod relations;
pub mod shapes;

pub use condition::{check_condition, filter_rows, Condition, Operator};
pub use relations::{
    NamingConvention, RelationClassifier, RelationKind, RelationNode, RelationResolver,
    RelationSpec,
};
pub use shapes::{ShapeKind, ShapeTable};

use crate::core::dataset::Dataset;
use crate::core::value::{timestamp_now, Row, Value};
use crate::utils::parsing::{parse_literal, quoted_names, split_top_level};
use regex::{Captures, Regex};
use relations::{build_relation_tree, path_has_results};
use serde::Serialize;

pub const MSG_CREATED: &str = "record created";
pub const MSG_UPDATED: &str = "record updated";
pub const MSG_DELETED: &str = "record deleted";
pub const MSG_EXECUTED: &str = "query executed";
pub const MSG_BAD_WHERE: &str = "unsupported where() arguments";

/// Row produced by `Model::create([...])`. The interpreter does not store it;
/// the caller appends `data` to `table`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatePayload {
    pub action: &'static str,
    pub message: String,
    pub data: Row,
    pub table: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusMessage {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

/// Outcome of one interpreted statement. Serializes as the bare row list,
/// row (or `null`), creation payload, or status object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    Rows(Vec<Row>),
    Single(Option<Row>),
    Created(CreatePayload),
    Status(StatusMessage),
}

impl QueryResult {
    fn status(message: &str, query: Option<&str>) -> Self {
        QueryResult::Status(StatusMessage {
            message: message.to_string(),
            query: query.map(str::to_string),
        })
    }

    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            QueryResult::Rows(rows) => Some(rows),
            _ => None,
        }
    }
}

/// Secondary patterns used once a statement shape has been recognized.
struct Extractors {
    decimal_comma: Regex,
    create_pair: Regex,
    where_call: Regex,
    with_call: Regex,
    closure_entry: Regex,
    closure_body: Regex,
    relation_name: Regex,
}

impl Extractors {
    fn new() -> Self {
        let re = |p: &str| Regex::new(p).expect("extractor patterns are valid");
        Self {
            decimal_comma: re(r"(\d+),(\d+)"),
            create_pair: re(r#"(?s)^['"](\w+)['"]\s*=>\s*(.+)$"#),
            where_call: re(r"\bwhere\(([^)]*)\)"),
            with_call: re(r"->\s*with\(([^)]*)\)"),
            closure_entry: re(
                r#"(?s)['"]([\w.]+)['"]\s*=>\s*function\s*\([^)]*\)\s*(?:use\s*\([^)]*\)\s*)?\{([^}]*)\}"#,
            ),
            closure_body: re(r"(?s)function\s*\([^)]*\)\s*(?:use\s*\([^)]*\)\s*)?\{[^}]*\}"),
            relation_name: re(r#"['"]([A-Za-z_][\w.]*)['"]\s*(=>)?"#),
        }
    }
}

/// Turns chained-call query text into filter, relation and create operations
/// over a caller-supplied [`Dataset`].
pub struct Interpreter {
    shapes: ShapeTable,
    resolver: RelationResolver,
    extract: Extractors,
}

impl Interpreter {
    pub fn new(resolver: RelationResolver) -> Self {
        Self {
            shapes: ShapeTable::new(),
            resolver,
            extract: Extractors::new(),
        }
    }

    /// Trim, and read `9,99` as `9.99`.
    pub fn preprocess(&self, query: &str) -> String {
        self.extract
            .decimal_comma
            .replace_all(query.trim(), "$1.$2")
            .into_owned()
    }

    /// Interpret one statement. Never fails: unrecognized text comes back as
    /// a status object echoing the query.
    pub fn interpret(&self, query: &str, dataset: &Dataset) -> QueryResult {
        let text = self.preprocess(query);
        match self.shapes.recognize(&text) {
            Some((kind, caps)) => {
                tracing::debug!(shape = %kind, "recognized statement");
                self.dispatch(kind, &caps, &text, dataset)
            }
            None => {
                tracing::debug!("no statement shape matched");
                QueryResult::status(MSG_EXECUTED, Some(query.trim()))
            }
        }
    }

    fn dispatch(&self, kind: ShapeKind, caps: &Captures<'_>, text: &str, dataset: &Dataset) -> QueryResult {
        let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());
        let table = self.resolver.resolve_table_name(group(1));

        match kind {
            ShapeKind::Create => self.handle_create(&table, group(2), dataset),
            ShapeKind::All => QueryResult::Rows(dataset.rows(&table).to_vec()),
            ShapeKind::ClosureWith => self.handle_closure_with(&table, group(2), dataset),
            ShapeKind::MultiWhere => self.handle_multi_where(&table, text, dataset),
            ShapeKind::WhereWith => {
                self.handle_where(&table, group(2), Some(group(3)), text, dataset)
            }
            ShapeKind::WhereGet => self.handle_where(&table, group(2), None, text, dataset),
            ShapeKind::WhereFirst => {
                match Condition::from_where_args(group(2)) {
                    Some(condition) => QueryResult::Single(
                        dataset
                            .rows(&table)
                            .iter()
                            .find(|row| condition.matches(row))
                            .cloned(),
                    ),
                    None => QueryResult::status(MSG_BAD_WHERE, Some(text)),
                }
            }
            ShapeKind::Find => {
                let id = group(2);
                QueryResult::Single(
                    dataset
                        .rows(&table)
                        .iter()
                        .find(|row| row.get("id").is_some_and(|v| v.as_key() == id))
                        .cloned(),
                )
            }
            ShapeKind::With => {
                let relations = plain_relations(group(2));
                QueryResult::Rows(self.attach_all(dataset.rows(&table), &relations, &table, dataset))
            }
            ShapeKind::Update => QueryResult::status(MSG_UPDATED, None),
            ShapeKind::Delete => QueryResult::status(MSG_DELETED, None),
        }
    }

    fn handle_create(&self, table: &str, body: &str, dataset: &Dataset) -> QueryResult {
        let mut data = Row::new();
        for pair in split_top_level(body) {
            if let Some(caps) = self.extract.create_pair.captures(&pair) {
                data.insert(caps[1].to_string(), parse_literal(&caps[2]));
            }
        }

        for stamp in ["created_at", "updated_at"] {
            if !data.contains_key(stamp) {
                data.insert(stamp.to_string(), timestamp_now());
            }
        }
        if !data.contains_key("id") {
            data.insert("id".to_string(), Value::Int(dataset.max_id(table).saturating_add(1)));
        }

        QueryResult::Created(CreatePayload {
            action: "create",
            message: MSG_CREATED.to_string(),
            data,
            table: table.to_string(),
        })
    }

    fn handle_closure_with(&self, table: &str, content: &str, dataset: &Dataset) -> QueryResult {
        let mut paths: Vec<(String, Vec<Condition>)> = Vec::new();
        for caps in self.extract.closure_entry.captures_iter(content) {
            let conditions: Vec<Condition> = self
                .extract
                .where_call
                .captures_iter(&caps[2])
                .filter_map(|w| Condition::from_where_args(&w[1]))
                .collect();
            paths.push((caps[1].to_string(), conditions));
        }

        let stripped = self.extract.closure_body.replace_all(content, "");
        for caps in self.extract.relation_name.captures_iter(&stripped) {
            // `'rel' => function ...` keys were collected above
            if caps.get(2).is_some() {
                continue;
            }
            let name = &caps[1];
            if !paths.iter().any(|(p, _)| p == name) {
                paths.push((name.to_string(), Vec::new()));
            }
        }

        let constrained: Vec<&str> = paths
            .iter()
            .filter(|(_, conditions)| !conditions.is_empty())
            .map(|(path, _)| path.as_str())
            .collect();
        let tree = build_relation_tree(&paths);

        let rows = dataset
            .rows(table)
            .iter()
            .map(|row| self.resolver.attach(row.clone(), &tree, table, dataset))
            .filter(|row| constrained.iter().all(|path| path_has_results(row, path)))
            .collect();
        QueryResult::Rows(rows)
    }

    fn handle_multi_where(&self, table: &str, text: &str, dataset: &Dataset) -> QueryResult {
        let mut conditions = Vec::new();
        for caps in self.extract.where_call.captures_iter(text) {
            match Condition::from_where_args(&caps[1]) {
                Some(condition) => conditions.push(condition),
                None => return QueryResult::status(MSG_BAD_WHERE, Some(text)),
            }
        }

        let filtered = filter_rows(dataset.rows(table), &conditions);
        match self.extract.with_call.captures(text) {
            Some(caps) => {
                let relations = plain_relations(&caps[1]);
                QueryResult::Rows(self.attach_all(&filtered, &relations, table, dataset))
            }
            None => QueryResult::Rows(filtered),
        }
    }

    fn handle_where(
        &self,
        table: &str,
        args: &str,
        relations: Option<&str>,
        text: &str,
        dataset: &Dataset,
    ) -> QueryResult {
        let condition = match Condition::from_where_args(args) {
            Some(condition) => condition,
            None => return QueryResult::status(MSG_BAD_WHERE, Some(text)),
        };
        let filtered = filter_rows(dataset.rows(table), std::slice::from_ref(&condition));
        match relations {
            Some(list) => {
                let relations = plain_relations(list);
                QueryResult::Rows(self.attach_all(&filtered, &relations, table, dataset))
            }
            None => QueryResult::Rows(filtered),
        }
    }

    fn attach_all(
        &self,
        rows: &[Row],
        relations: &[(String, Vec<Condition>)],
        table: &str,
        dataset: &Dataset,
    ) -> Vec<Row> {
        let tree = build_relation_tree(relations);
        rows.iter()
            .map(|row| self.resolver.attach(row.clone(), &tree, table, dataset))
            .collect()
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(RelationResolver::default())
    }
}

/// Relation paths of a `with(...)` argument list: quoted names, bracketed or not.
fn plain_relations(list: &str) -> Vec<(String, Vec<Condition>)> {
    quoted_names(list)
        .into_iter()
        .map(|name| (name, Vec::new()))
        .collect()
}
