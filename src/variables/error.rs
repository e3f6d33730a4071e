//! Errors raised while resolving saved-value tokens.
//!
//! Unknown variables are not errors: unresolved tokens are left in the text.

use std::fmt;

/// Errors that can occur during token substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarError {
    /// A rewrite modifier's pattern is not a valid regular expression.
    InvalidPattern {
        /// The pattern as written in the token
        pattern: String,
        /// Compiler message from the regex engine
        message: String,
    },
}

impl fmt::Display for VarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarError::InvalidPattern { pattern, message } => {
                write!(f, "Invalid rewrite pattern '{}': {}", pattern, message)
            }
        }
    }
}

impl std::error::Error for VarError {}
