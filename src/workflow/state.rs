//! The request list and everything keyed by position in it.
//!
//! [`WorkflowState`] owns three collections that must stay consistent with
//! each other: the ordered request definitions, the responses keyed by the
//! index of the request that produced them, and the saved values whose
//! availability is expressed as such an index. Every mutation of the list
//! re-indexes the other two in the same call.

use super::error::WorkflowError;
use super::validation::validate_variable_name;
use crate::formatter::format_tolerant;
use crate::models::{Availability, RequestDefinition, ResponseRecord, SaveConfig, SavedValue};
use crate::variables::{compute_scope, extract_nested_response_data, response_keys, Scope};
use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;

/// Requests, their responses and the saved-value store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowState {
    requests: Vec<RequestDefinition>,
    responses: BTreeMap<usize, ResponseRecord>,
    saved: BTreeMap<String, SavedValue>,
}

impl WorkflowState {
    /// Creates an empty workflow.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembles a workflow from already consistent parts.
    pub(crate) fn from_parts(
        requests: Vec<RequestDefinition>,
        responses: BTreeMap<usize, ResponseRecord>,
        saved: BTreeMap<String, SavedValue>,
    ) -> Self {
        Self {
            requests,
            responses,
            saved,
        }
    }

    pub fn requests(&self) -> &[RequestDefinition] {
        &self.requests
    }

    pub fn responses(&self) -> &BTreeMap<usize, ResponseRecord> {
        &self.responses
    }

    pub fn saved(&self) -> &BTreeMap<String, SavedValue> {
        &self.saved
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn request(&self, index: usize) -> Option<&RequestDefinition> {
        self.requests.get(index)
    }

    pub fn response(&self, index: usize) -> Option<&ResponseRecord> {
        self.responses.get(&index)
    }

    /// Adds a request to the end of the list and returns its index.
    ///
    /// The arguments and headers text is pretty-printed.
    pub fn append(&mut self, definition: RequestDefinition) -> usize {
        self.requests.push(formatted(definition));
        self.requests.len() - 1
    }

    /// Replaces the request at `index` with an edited definition.
    ///
    /// The replacement gets a fresh identifier and the stale response at
    /// `index` is cleared. Saved values captured from it are kept.
    pub fn replace(
        &mut self,
        index: usize,
        definition: RequestDefinition,
    ) -> Result<(), WorkflowError> {
        self.check_index(index)?;

        self.requests[index] = formatted(definition.with_new_id());
        self.responses.remove(&index);
        Ok(())
    }

    /// Inserts a request directly after `index` and returns its new index.
    ///
    /// Responses and saved values belonging to requests after `index` move
    /// up by one; those at `index` itself stay where they are.
    pub fn insert_after(
        &mut self,
        index: usize,
        definition: RequestDefinition,
    ) -> Result<usize, WorkflowError> {
        self.check_index(index)?;

        self.responses = std::mem::take(&mut self.responses)
            .into_iter()
            .map(|(i, record)| if i > index { (i + 1, record) } else { (i, record) })
            .collect();

        for value in self.saved.values_mut() {
            if let Availability::AfterRequest(source) = value.available_from {
                if source > index {
                    value.available_from = Availability::AfterRequest(source + 1);
                }
            }
        }

        self.requests.insert(index + 1, formatted(definition));
        debug!("Inserted request at {}, shifted later entries up", index + 1);
        Ok(index + 1)
    }

    /// Removes the request at `index` and returns it.
    ///
    /// Its response is dropped and saved values captured from it are purged.
    /// Responses and saved values belonging to later requests move down by one.
    pub fn delete(&mut self, index: usize) -> Result<RequestDefinition, WorkflowError> {
        self.check_index(index)?;

        self.responses = std::mem::take(&mut self.responses)
            .into_iter()
            .filter(|(i, _)| *i != index)
            .map(|(i, record)| if i > index { (i - 1, record) } else { (i, record) })
            .collect();

        self.saved
            .retain(|_, value| value.available_from != Availability::AfterRequest(index));

        for value in self.saved.values_mut() {
            if let Availability::AfterRequest(source) = value.available_from {
                if source > index {
                    value.available_from = Availability::AfterRequest(source - 1);
                }
            }
        }

        debug!("Deleted request at {}, shifted later entries down", index);
        Ok(self.requests.remove(index))
    }

    /// Stores a new saved value.
    ///
    /// The name is checked here, at the moment of insertion, even if the
    /// caller validated it before: a second save under an existing name is
    /// rejected and the first value is left unchanged.
    pub fn save_value(&mut self, config: SaveConfig) -> Result<(), WorkflowError> {
        validate_variable_name(&config.name, &self.saved)?;

        let (name, value) = config.into_entry();
        debug!("Saved value '{}' ({:?})", name, value.available_from);
        self.saved.insert(name, value);
        Ok(())
    }

    /// Extracts `key` from the response at `index` and saves it as `name`.
    ///
    /// The value becomes visible to requests after `index`.
    pub fn save_from_response(
        &mut self,
        index: usize,
        key: &str,
        name: &str,
    ) -> Result<(), WorkflowError> {
        let record = self
            .responses
            .get(&index)
            .ok_or(WorkflowError::NoResponse(index))?;

        let data = extract_nested_response_data(key, record).ok_or_else(|| {
            WorkflowError::ExtractionMiss {
                index,
                key: key.to_string(),
            }
        })?;

        self.save_value(SaveConfig::from_response(name, key, data, index))
    }

    /// Saves a value entered by hand, visible to every request.
    pub fn save_manual(&mut self, name: &str, data: impl Into<Value>) -> Result<(), WorkflowError> {
        self.save_value(SaveConfig::manual(name, data))
    }

    /// Lists the extraction paths available in the response at `index`.
    pub fn response_keys(&self, index: usize) -> Result<Vec<String>, WorkflowError> {
        let record = self
            .responses
            .get(&index)
            .ok_or(WorkflowError::NoResponse(index))?;

        Ok(record.data.as_ref().map(response_keys).unwrap_or_default())
    }

    /// The saved values visible to the request at `index`.
    pub fn scope_for(&self, index: usize) -> Scope {
        compute_scope(&self.saved, index)
    }

    /// Stores the response of the request at `index`.
    pub fn set_response(&mut self, index: usize, record: ResponseRecord) {
        self.responses.insert(index, record);
    }

    /// Forgets the response of the request at `index`.
    pub fn clear_response(&mut self, index: usize) -> Option<ResponseRecord> {
        self.responses.remove(&index)
    }

    /// Forgets every stored response.
    pub fn clear_responses(&mut self) {
        self.responses.clear();
    }

    /// Re-extracts every value captured from the request at `index` from its
    /// current response and returns how many were updated.
    ///
    /// A path that no longer resolves leaves the previous value in place.
    pub fn refresh_saved_from(&mut self, index: usize) -> usize {
        let Some(record) = self.responses.get(&index) else {
            return 0;
        };

        let mut refreshed = 0;
        for (name, value) in self.saved.iter_mut() {
            if value.available_from != Availability::AfterRequest(index) || value.key.is_empty() {
                continue;
            }

            match extract_nested_response_data(&value.key, record) {
                Some(data) => {
                    debug!("Refreshed '{}' from response {}", name, index);
                    value.data = data;
                    refreshed += 1;
                }
                None => {
                    debug!(
                        "Key '{}' missing from response {}, keeping previous '{}'",
                        value.key, index, name
                    );
                }
            }
        }

        refreshed
    }

    /// Clears requests, responses and saved values.
    pub fn reset(&mut self) {
        self.requests.clear();
        self.responses.clear();
        self.saved.clear();
    }

    fn check_index(&self, index: usize) -> Result<(), WorkflowError> {
        if index < self.requests.len() {
            Ok(())
        } else {
            Err(WorkflowError::IndexOutOfRange {
                index,
                len: self.requests.len(),
            })
        }
    }
}

/// Pretty-prints a definition's arguments and headers text.
fn formatted(mut definition: RequestDefinition) -> RequestDefinition {
    definition.arguments = format_tolerant(&definition.arguments);
    definition.headers = format_tolerant(&definition.headers);
    definition
}
