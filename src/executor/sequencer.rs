//! Execution sequencer.
//!
//! [`Workflow`] couples a [`WorkflowState`] with an [`HttpClient`] and runs
//! requests against it. The state sits behind a mutex that is only held
//! between awaits: a run locks to read the request and its scope, releases
//! the lock for the HTTP call, and locks again to write the result. Separate
//! `run_one` calls may therefore overlap, each writing only its own slot.
//!
//! Sequential runs await every step, including the refresh of saved values
//! captured from it, before the next step computes its scope.

use crate::executor::client::{HttpCall, HttpClient};
use crate::executor::config::RunConfig;
use crate::models::{RequestDefinition, ResponseRecord, SaveConfig, SavedValue};
use crate::workflow::{self, FileError, WorkflowError, WorkflowState};
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A request list bound to an HTTP client.
///
/// Cloning is cheap and yields a handle to the same workflow.
pub struct Workflow<C> {
    state: Arc<Mutex<WorkflowState>>,
    client: Arc<C>,
    run_config: RunConfig,
}

impl<C> Clone for Workflow<C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            client: Arc::clone(&self.client),
            run_config: self.run_config,
        }
    }
}

impl<C: HttpClient> Workflow<C> {
    /// Creates an empty workflow using the global run configuration.
    pub fn new(client: C) -> Self {
        Self::with_state(client, WorkflowState::new(), RunConfig::default())
    }

    /// Creates a workflow around existing state.
    pub fn with_state(client: C, state: WorkflowState, run_config: RunConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            client: Arc::new(client),
            run_config,
        }
    }

    /// The client requests are dispatched through.
    pub fn client(&self) -> &C {
        &self.client
    }

    fn lock(&self) -> MutexGuard<'_, WorkflowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Request list

    /// Appends a new request and returns its index.
    pub fn submit(&self, definition: RequestDefinition) -> usize {
        self.lock().append(definition)
    }

    /// Replaces the request at `index`, clearing its response.
    pub fn edit(&self, index: usize, definition: RequestDefinition) -> Result<(), WorkflowError> {
        self.lock().replace(index, definition)
    }

    /// Inserts a request after `index` and returns its index.
    pub fn insert_after(
        &self,
        index: usize,
        definition: RequestDefinition,
    ) -> Result<usize, WorkflowError> {
        self.lock().insert_after(index, definition)
    }

    /// Deletes the request at `index`.
    pub fn delete(&self, index: usize) -> Result<RequestDefinition, WorkflowError> {
        self.lock().delete(index)
    }

    // Saved values

    pub fn save_value(&self, config: SaveConfig) -> Result<(), WorkflowError> {
        self.lock().save_value(config)
    }

    pub fn save_from_response(
        &self,
        index: usize,
        key: &str,
        name: &str,
    ) -> Result<(), WorkflowError> {
        self.lock().save_from_response(index, key, name)
    }

    pub fn save_manual(&self, name: &str, data: impl Into<Value>) -> Result<(), WorkflowError> {
        self.lock().save_manual(name, data)
    }

    pub fn response_keys(&self, index: usize) -> Result<Vec<String>, WorkflowError> {
        self.lock().response_keys(index)
    }

    /// Clears requests, responses and saved values.
    pub fn reset(&self) {
        self.lock().reset();
    }

    // Accessors

    pub fn requests(&self) -> Vec<RequestDefinition> {
        self.lock().requests().to_vec()
    }

    pub fn responses(&self) -> BTreeMap<usize, ResponseRecord> {
        self.lock().responses().clone()
    }

    pub fn saved(&self) -> BTreeMap<String, SavedValue> {
        self.lock().saved().clone()
    }

    /// A copy of the whole current state.
    pub fn snapshot(&self) -> WorkflowState {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Files

    /// Replaces the current state with a parsed workflow file.
    ///
    /// The current state is only touched once the whole file has parsed.
    pub fn load_str(&self, json: &str) -> Result<(), FileError> {
        let loaded = workflow::load_str(json)?;
        *self.lock() = loaded;
        Ok(())
    }

    /// Serializes the current state as a workflow file.
    pub fn to_json_string(&self) -> Result<String, FileError> {
        workflow::to_json_string(&self.lock())
    }

    // Execution

    /// Runs the request at `index` and returns the record stored for it.
    ///
    /// Transport failures and 5xx responses are logged and leave the slot
    /// empty (`Ok(None)`). A request that cannot be prepared, e.g. because of
    /// a malformed rewrite pattern, is stored as a failed record. Only an
    /// index that does not exist when the run starts is an error.
    pub async fn run_one(&self, index: usize) -> Result<Option<ResponseRecord>, WorkflowError> {
        let prepared = {
            let state = self.lock();
            let definition = state
                .request(index)
                .ok_or(WorkflowError::IndexOutOfRange {
                    index,
                    len: state.len(),
                })?;
            HttpCall::prepare(definition, &state.scope_for(index))
        };

        let outcome = match prepared {
            Ok(call) => {
                debug!("Dispatching [{}] {} {}", index, call.method, call.url);
                self.client.call(&call).await
            }
            Err(e) => Err(e),
        };

        let record = match outcome {
            Ok(response) if response.is_server_error() => {
                warn!(
                    "Request {} returned {} {}",
                    index, response.status_code, response.status_text
                );
                None
            }
            Ok(response) if response.is_client_error() => {
                Some(ResponseRecord::status_only(&response))
            }
            Ok(response) => Some(ResponseRecord::from_http(&response)),
            Err(e) if e.is_preparation_error() => {
                warn!("Request {} could not be prepared: {}", index, e);
                Some(ResponseRecord::failed(e.to_string()))
            }
            Err(e) => {
                warn!("Request {} failed: {}", index, e);
                None
            }
        };

        let mut state = self.lock();
        if index >= state.len() {
            warn!(
                "Request {} no longer exists (list has {}), discarding its result",
                index,
                state.len()
            );
            return Ok(None);
        }

        match &record {
            Some(record) => {
                state.set_response(index, record.clone());
                state.refresh_saved_from(index);
            }
            None => {
                state.clear_response(index);
            }
        }

        Ok(record)
    }

    /// Runs every request from `start` to the end of the list, one at a time.
    ///
    /// Each step finishes, including refreshing saved values, before the next
    /// one resolves its references. Failed steps do not stop the run.
    pub async fn run_from_onward(&self, start: usize) {
        let mut index = start;

        while index < self.len() {
            if index > start && !self.run_config.request_delay.is_zero() {
                tokio::time::sleep(self.run_config.request_delay).await;
            }

            if self.run_one(index).await.is_err() {
                break;
            }
            index += 1;
        }

        info!(
            "Sequential run from {} finished after {} requests",
            start,
            index - start
        );
    }

    /// Clears every response and runs the whole list in order.
    pub async fn run_all(&self) {
        self.lock().clear_responses();
        self.run_from_onward(0).await;
    }
}
