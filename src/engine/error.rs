use crate::core::config::ConfigError;
use crate::core::value::Row;
use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

/// Per-row validation failures from a `process` call.
///
/// `errors` is keyed `row_<index>`; `rows` holds every row as processed in the
/// failed attempt so a caller can show what autofill would have produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub errors: IndexMap<String, Vec<String>>,
    pub rows: Vec<Row>,
}

impl ValidationError {
    /// The error map as JSON text, the form HTTP clients receive.
    pub fn errors_json(&self) -> String {
        serde_json::to_string(&self.errors).unwrap_or_default()
    }

    pub fn messages_for(&self, row: usize) -> &[String] {
        self.errors
            .get(&format!("row_{}", row))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation failed: {}", self.errors_json())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Error, Debug)]
pub enum SandboxError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for SandboxError {
    fn from(e: serde_json::Error) -> Self {
        SandboxError::MalformedInput(e.to_string())
    }
}
