// src/lib.rs

pub mod core;

pub mod dsl;
pub mod engine;
pub mod parser;
pub mod query;
pub mod server;
pub mod utils;

pub use core::dataset;
pub use core::schema;
pub use core::value;

// Flat API for hosts and integration tests
pub use core::config::{ConfigError, RelationConfig, SandboxConfig, ServerConfig};
pub use dataset::Dataset;
pub use dsl::{execute_line, execute_script, DslError, DslOutput, Session};
pub use engine::{process, read_dataset, Sandbox, SandboxError, ValidationError};
pub use parser::{parse_schema, SchemaParser};
pub use query::{
    check_condition, Condition, CreatePayload, Interpreter, Operator, QueryResult,
    RelationClassifier, RelationKind, RelationResolver, ShapeKind,
};
pub use schema::{ColumnDefinition, ColumnType, TableSet};
pub use value::{normalize, Row, Value};
