pub mod introspection;
pub mod persistence;
pub mod query;
pub mod schema;

pub use introspection::handle_show;
pub use persistence::handle_save;
pub use query::handle_query;
pub use schema::{handle_schema, is_schema_statement};
