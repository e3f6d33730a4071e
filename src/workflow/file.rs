//! Workflow files.
//!
//! A workflow file is a JSON document holding the request list, the stored
//! responses keyed by request index, and the saved values keyed by name:
//!
//! ```json
//! {
//!   "requests": [{"url": "...", "method": "get", "arguments": "", "headers": "", "identifier": "..."}],
//!   "responses": {"0": {"status": 200, "statusText": "OK", "data": {}}},
//!   "saved": {"token": {"data": "abc", "key": "token", "availableFrom": 0}}
//! }
//! ```
//!
//! All three keys are required. A file that fails to parse is rejected as a
//! whole.

use super::state::WorkflowState;
use crate::models::{RequestDefinition, ResponseRecord, SavedValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// Errors that can occur while reading or writing a workflow file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileError {
    /// IO error occurred while reading or writing the file
    Io(String),

    /// The content is not a valid workflow document
    Parse(String),
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::Io(msg) => write!(f, "IO error: {}", msg),
            FileError::Parse(msg) => write!(f, "Failed to parse workflow file: {}", msg),
        }
    }
}

impl std::error::Error for FileError {}

impl From<io::Error> for FileError {
    fn from(err: io::Error) -> Self {
        FileError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for FileError {
    fn from(err: serde_json::Error) -> Self {
        FileError::Parse(err.to_string())
    }
}

/// On-disk shape of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowFile {
    pub requests: Vec<RequestDefinition>,
    pub responses: BTreeMap<usize, ResponseRecord>,
    pub saved: BTreeMap<String, SavedValue>,
}

impl WorkflowFile {
    /// Captures the current state of a workflow.
    pub fn from_state(state: &WorkflowState) -> Self {
        Self {
            requests: state.requests().to_vec(),
            responses: state.responses().clone(),
            saved: state.saved().clone(),
        }
    }

    /// Checks cross-references and converts into a workflow state.
    pub fn into_state(self) -> Result<WorkflowState, FileError> {
        let len = self.requests.len();

        if let Some(index) = self.responses.keys().find(|index| **index >= len) {
            return Err(FileError::Parse(format!(
                "response stored for request {} but the file has {} requests",
                index, len
            )));
        }

        if let Some(name) = self
            .saved
            .keys()
            .find(|name| !crate::variables::is_valid_name(name))
        {
            return Err(FileError::Parse(format!("invalid saved value name '{}'", name)));
        }

        Ok(WorkflowState::from_parts(self.requests, self.responses, self.saved))
    }
}

/// Parses a workflow from JSON text.
pub fn load_str(json: &str) -> Result<WorkflowState, FileError> {
    let file: WorkflowFile = serde_json::from_str(json)?;
    file.into_state()
}

/// Reads and parses a workflow file.
pub fn load_path(path: &Path) -> Result<WorkflowState, FileError> {
    let content = fs::read_to_string(path)?;
    load_str(&content)
}

/// Serializes a workflow as pretty-printed JSON.
pub fn to_json_string(state: &WorkflowState) -> Result<String, FileError> {
    Ok(serde_json::to_string_pretty(&WorkflowFile::from_state(state))?)
}

/// Writes a workflow to `path`, replacing any existing file.
pub fn save_path(state: &WorkflowState, path: &Path) -> Result<(), FileError> {
    fs::write(path, to_json_string(state)?)?;
    Ok(())
}
