use crate::engine::ValidationError;
use thiserror::Error;

/// Script errors, tagged with the line the failing statement starts on.
#[derive(Error, Debug)]
pub enum DslError {
    #[error("[line {line}] Parse error: {msg}")]
    Parse { line: usize, msg: String },

    #[error("[line {line}] {source}")]
    Validation {
        line: usize,
        source: ValidationError,
    },
}

impl DslError {
    pub fn line(&self) -> usize {
        match self {
            DslError::Parse { line, .. }
            | DslError::Validation { line, .. } => *line,
        }
    }
}
