pub mod autofill;
pub mod error;
pub mod sandbox;

pub use autofill::process;
pub use error::{SandboxError, ValidationError};
pub use sandbox::{read_dataset, Sandbox};
