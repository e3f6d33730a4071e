//! Request text formatter.
//!
//! Arguments and headers are stored as pretty-printed JSON text. Because that
//! text may hold `!name!` references that only become JSON once substituted,
//! formatting goes through [`format_tolerant`], which never rejects input.

pub mod json;

pub use json::{format_json_pretty, format_tolerant, validate_json};

use std::fmt;

/// Errors that can occur during formatting.
#[derive(Debug)]
pub enum FormatError {
    /// JSON parsing or formatting error.
    JsonError(String),

    /// UTF-8 encoding error.
    EncodingError(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::JsonError(msg) => write!(f, "JSON formatting error: {}", msg),
            FormatError::EncodingError(msg) => write!(f, "Encoding error: {}", msg),
        }
    }
}

impl std::error::Error for FormatError {}
