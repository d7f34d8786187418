//! Relation inference between tables.
//!
//! Relations are not declared anywhere; they are inferred from naming
//! conventions. A relation called `products` on table `brands` is a has-many
//! joined on `products.brand_id = brands.id`; a relation called `brand` on
//! table `products` is a belongs-to joined on `products.brand_id = brands.id`.
//!
//! The has-many/belongs-to decision is a [`RelationClassifier`]; the default
//! [`NamingConvention`] misclassifies a belongs-to relation whose name ends in
//! `s` (e.g. `status`), which callers currently rely on.

use super::condition::{matches_all, Condition};
use crate::core::config::RelationConfig;
use crate::core::dataset::Dataset;
use crate::core::value::{Row, Value};
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelationKind {
    HasMany,
    BelongsTo,
}

/// Decides the cardinality of a relation from the owning table's name.
pub trait RelationClassifier: Send + Sync {
    fn classify(&self, table_name: &str, relation_name: &str) -> RelationKind;
}

/// Plural relation name that is not the table itself: has-many.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamingConvention;

impl RelationClassifier for NamingConvention {
    fn classify(&self, table_name: &str, relation_name: &str) -> RelationKind {
        if relation_name.ends_with('s') && singularize(relation_name) != singularize(table_name) {
            RelationKind::HasMany
        } else {
            RelationKind::BelongsTo
        }
    }
}

/// Drop one trailing `s`.
pub fn singularize(name: &str) -> &str {
    name.strip_suffix('s').unwrap_or(name)
}

/// Everything needed to join one relation, computed on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationSpec {
    pub name: String,
    pub kind: RelationKind,
    /// Table the related rows live in.
    pub table: String,
    /// Column holding the join value: on the related rows for has-many,
    /// on the owning row for belongs-to.
    pub join_key: String,
}

/// One level of a `with(...)` relation list.
///
/// `['products.brand', 'products.supplier']` becomes a single `products` node
/// with two children, so `products` is fetched once per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationNode {
    pub name: String,
    /// Constraints on the related rows (closure form only).
    pub conditions: Vec<Condition>,
    pub children: Vec<RelationNode>,
}

/// Group dotted relation paths by their first segment, keeping first-seen order.
/// Conditions attached to a path apply to its last segment.
pub fn build_relation_tree(paths: &[(String, Vec<Condition>)]) -> Vec<RelationNode> {
    let mut roots: Vec<RelationNode> = Vec::new();
    for (path, conditions) in paths {
        let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
        if !segments.is_empty() {
            insert_path(&mut roots, &segments, conditions);
        }
    }
    roots
}

fn insert_path(nodes: &mut Vec<RelationNode>, segments: &[&str], conditions: &[Condition]) {
    let (first, rest) = match segments.split_first() {
        Some(split) => split,
        None => return,
    };
    let idx = match nodes.iter().position(|n| n.name == *first) {
        Some(idx) => idx,
        None => {
            nodes.push(RelationNode {
                name: first.to_string(),
                ..Default::default()
            });
            nodes.len() - 1
        }
    };
    if rest.is_empty() {
        nodes[idx].conditions.extend_from_slice(conditions);
    } else {
        insert_path(&mut nodes[idx].children, rest, conditions);
    }
}

/// True when the dotted `path` under `row` reached at least one related row.
pub fn path_has_results(row: &Row, path: &str) -> bool {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    match segments.split_first() {
        Some((first, rest)) => row
            .get(*first)
            .is_some_and(|value| value_has_results(value, rest)),
        None => false,
    }
}

fn value_has_results(value: &Value, rest: &[&str]) -> bool {
    let (next, remaining) = match rest.split_first() {
        Some(split) => split,
        None => return !value.is_empty_relation(),
    };
    let descend = |row: &Row| {
        row.get(*next)
            .is_some_and(|v| value_has_results(v, remaining))
    };
    match value {
        Value::List(items) => items.iter().filter_map(Value::as_record).any(descend),
        Value::Record(row) => descend(row),
        _ => false,
    }
}

/// Maps model and relation names to tables and joins related rows.
pub struct RelationResolver {
    models: IndexMap<String, String>,
    foreign_keys: IndexMap<String, String>,
    classifier: Box<dyn RelationClassifier>,
}

impl RelationResolver {
    pub fn new(config: &RelationConfig) -> Self {
        Self {
            models: config.model_table_map(),
            foreign_keys: config.foreign_key_map(),
            classifier: Box::new(NamingConvention),
        }
    }

    /// Swap the has-many/belongs-to heuristic.
    pub fn with_classifier(mut self, classifier: impl RelationClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    /// `Product` -> `products`, `Category` -> `categories` (configured).
    pub fn resolve_table_name(&self, model: &str) -> String {
        let lower = model.to_lowercase();
        if let Some(table) = self.models.get(&lower) {
            return table.clone();
        }
        if lower.ends_with('s') {
            lower
        } else {
            format!("{}s", lower)
        }
    }

    pub fn relation_kind(&self, table_name: &str, relation_name: &str) -> RelationKind {
        self.classifier.classify(table_name, relation_name)
    }

    /// Column other tables use to reference `table_name`.
    pub fn foreign_key_for(&self, table_name: &str) -> String {
        match self.foreign_keys.get(table_name) {
            Some(key) => key.clone(),
            None => format!("{}_id", singularize(table_name)),
        }
    }

    /// Table holding a relation's rows. Falls back to the first dataset table
    /// whose name contains the relation name, or whose singular form is
    /// contained in it.
    pub fn relation_table(&self, relation_name: &str, dataset: &Dataset) -> String {
        let table = self.resolve_table_name(relation_name);
        if dataset.contains_table(&table) {
            return table;
        }
        let lower = relation_name.to_lowercase();
        dataset
            .table_names()
            .find(|t| {
                let singular = singularize(t);
                t.contains(&lower) || (!singular.is_empty() && lower.contains(singular))
            })
            .map(str::to_string)
            .unwrap_or(table)
    }

    pub fn spec(&self, relation_name: &str, current_table: &str, dataset: &Dataset) -> RelationSpec {
        let kind = self.relation_kind(current_table, relation_name);
        let join_key = match kind {
            RelationKind::HasMany => self.foreign_key_for(current_table),
            RelationKind::BelongsTo => format!("{}_id", singularize(relation_name)),
        };
        RelationSpec {
            name: relation_name.to_string(),
            kind,
            table: self.relation_table(relation_name, dataset),
            join_key,
        }
    }

    /// Related row(s) of `row`: a list for has-many (filtered by `conditions`),
    /// a record or null for belongs-to.
    pub fn fetch_relation(
        &self,
        row: &Row,
        relation_name: &str,
        current_table: &str,
        dataset: &Dataset,
        conditions: &[Condition],
    ) -> Value {
        let spec = self.spec(relation_name, current_table, dataset);
        self.fetch(row, &spec, dataset, conditions)
    }

    fn fetch(&self, row: &Row, spec: &RelationSpec, dataset: &Dataset, conditions: &[Condition]) -> Value {
        let related = dataset.rows(&spec.table);
        match spec.kind {
            RelationKind::HasMany => {
                let owner_id = match row.get("id") {
                    Some(id) if !id.is_null() => id.as_key(),
                    _ => return Value::List(Vec::new()),
                };
                let matches: Vec<Row> = related
                    .iter()
                    .filter(|r| {
                        r.get(&spec.join_key)
                            .is_some_and(|fk| !fk.is_null() && fk.as_key() == owner_id)
                    })
                    .filter(|r| matches_all(r, conditions))
                    .cloned()
                    .collect();
                Value::from(matches)
            }
            RelationKind::BelongsTo => {
                let target = match row.get(&spec.join_key) {
                    Some(key) if !key.is_null() => key.as_key(),
                    _ => return Value::Null,
                };
                related
                    .iter()
                    .find(|r| r.get("id").is_some_and(|id| id.as_key() == target))
                    .cloned()
                    .map(Value::Record)
                    .unwrap_or(Value::Null)
            }
        }
    }

    /// Attach every relation in `nodes` to `row`, recursing into children.
    pub fn attach(&self, mut row: Row, nodes: &[RelationNode], current_table: &str, dataset: &Dataset) -> Row {
        for node in nodes {
            let spec = self.spec(&node.name, current_table, dataset);
            let mut value = self.fetch(&row, &spec, dataset, &node.conditions);
            if !node.children.is_empty() {
                value = self.attach_children(value, &node.children, &spec.table, dataset);
            }
            row.insert(node.name.clone(), value);
        }
        row
    }

    fn attach_children(&self, value: Value, children: &[RelationNode], table: &str, dataset: &Dataset) -> Value {
        match value {
            Value::List(items) => Value::List(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::Record(r) => Value::Record(self.attach(r, children, table, dataset)),
                        other => other,
                    })
                    .collect(),
            ),
            Value::Record(r) => Value::Record(self.attach(r, children, table, dataset)),
            other => other,
        }
    }
}

impl Default for RelationResolver {
    fn default() -> Self {
        Self::new(&RelationConfig::default())
    }
}
