//! Workflow error types.

use std::fmt;

/// Errors raised by request list and saved-value operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// A saved value with this exact name already exists.
    NameConflict(String),

    /// The name is empty or not ASCII alphanumeric.
    InvalidName(String),

    /// The index does not address an existing request.
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Current length of the request list
        len: usize,
    },

    /// The extraction path did not resolve in the stored response.
    ExtractionMiss {
        /// Index of the response that was searched
        index: usize,
        /// The `/`-separated path that missed
        key: String,
    },

    /// No response is stored for the request at this index.
    NoResponse(usize),
}

impl WorkflowError {
    /// Whether this is a validation failure the caller can correct by
    /// choosing a different name.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WorkflowError::NameConflict(_) | WorkflowError::InvalidName(_)
        )
    }
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowError::NameConflict(name) => {
                write!(f, "A saved value named '{}' already exists", name)
            }
            WorkflowError::InvalidName(name) => write!(
                f,
                "Invalid saved value name '{}': use letters and digits only",
                name
            ),
            WorkflowError::IndexOutOfRange { index, len } => write!(
                f,
                "Request index {} is out of range (list has {} requests)",
                index, len
            ),
            WorkflowError::ExtractionMiss { index, key } => write!(
                f,
                "Key '{}' not found in the response of request {}",
                key, index
            ),
            WorkflowError::NoResponse(index) => {
                write!(f, "Request {} has no stored response", index)
            }
        }
    }
}

impl std::error::Error for WorkflowError {}
