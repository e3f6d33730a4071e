//! Request list management.
//!
//! This module owns the ordered request list together with the responses and
//! saved values keyed by position in it, the workflow file format, and the
//! validation applied before requests and names are accepted.

pub mod error;
pub mod file;
pub mod state;
pub mod validation;

pub use error::WorkflowError;
pub use file::{load_path, load_str, save_path, to_json_string, FileError, WorkflowFile};
pub use state::WorkflowState;
pub use validation::{validate_json_field, validate_url, validate_variable_name, ValidationError};
