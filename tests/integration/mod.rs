//! Integration tests module.
//!
//! Shared helpers for workflow tests: a scripted in-process client and a
//! wiremock-backed setup for the real client.

pub mod end_to_end_test;
pub mod request_chaining_test;
pub mod workflow_file_test;

use apex::executor::{HttpCall, HttpClient, RequestError, RunConfig, Workflow};
use apex::models::HttpResponse;
use apex::workflow::WorkflowState;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Mutex, Once};
use std::time::Duration;

static INIT: Once = Once::new();

/// Initialize test environment (run once)
pub fn init_test_env() {
    INIT.call_once(|| {
        // Tests run without a logger; log macros are no-ops
    });
}

/// Client that answers from a fixed route table and records every call.
#[derive(Default)]
pub struct ScriptedClient {
    routes: Vec<(String, u16, Value)>,
    calls: Mutex<Vec<HttpCall>>,
}

impl ScriptedClient {
    pub fn route(mut self, url: &str, status: u16, body: Value) -> Self {
        self.routes.push((url.to_string(), status, body));
        self
    }

    pub fn calls(&self) -> Vec<HttpCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for ScriptedClient {
    async fn call(&self, call: &HttpCall) -> Result<HttpResponse, RequestError> {
        self.calls.lock().unwrap().push(call.clone());

        let (_, status, body) = self
            .routes
            .iter()
            .find(|(url, _, _)| *url == call.url)
            .ok_or_else(|| RequestError::NetworkError(format!("no route for {}", call.url)))?;

        let mut response = HttpResponse::new(*status, "Scripted");
        response.add_header("Content-Type", "application/json");
        response.set_body(body.to_string());
        Ok(response)
    }
}

/// Wraps a client in an empty workflow without inter-request delay.
pub fn workflow_with<C: HttpClient>(client: C) -> Workflow<C> {
    Workflow::with_state(client, WorkflowState::new(), RunConfig::new(Duration::ZERO))
}
