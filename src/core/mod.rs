pub mod config;
pub mod dataset;
pub mod schema;
pub mod value;

// Re-export commonly used types
pub use config::SandboxConfig;
pub use dataset::Dataset;
pub use schema::{ColumnDefinition, ColumnType, TableSet};
pub use value::{normalize, Row, Value};
