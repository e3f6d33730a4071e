//! HTTP response data models.
//!
//! [`HttpResponse`] is what the transport hands back for a dispatched call.
//! [`ResponseRecord`] is what a workflow keeps per request position and what
//! is written to workflow files.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Represents an HTTP response received from a server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpResponse {
    /// HTTP status code (e.g., 200, 404, 500).
    pub status_code: u16,

    /// HTTP status text (e.g., "OK", "Not Found").
    pub status_text: String,

    /// Response headers as key-value pairs.
    pub headers: HashMap<String, String>,

    /// Response body as raw bytes.
    pub body: Vec<u8>,

}

impl HttpResponse {
    /// Creates a new HttpResponse with the given status code and text.
    pub fn new(status_code: u16, status_text: impl Into<String>) -> Self {
        Self {
            status_code,
            status_text: status_text.into(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Checks if the response status indicates a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code)
    }

    /// Checks if the response status indicates a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code)
    }

    /// Adds a header to the response.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Sets the response body.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    /// Interprets the body as workflow data.
    ///
    /// JSON bodies are parsed, any other text becomes a JSON string, and an
    /// empty body yields `None`.
    pub fn data(&self) -> Option<Value> {
        if self.body.is_empty() {
            return None;
        }

        if let Ok(value) = serde_json::from_slice::<Value>(&self.body) {
            return Some(value);
        }

        Some(Value::String(
            String::from_utf8_lossy(&self.body).into_owned(),
        ))
    }
}

/// The stored outcome of running the request at a given list position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    /// HTTP status code. `0` marks a request that could not be prepared.
    pub status: u16,

    /// HTTP status text, or the preparation error for status `0`.
    pub status_text: String,

    /// Parsed response body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Response headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, Value>>,
}

impl ResponseRecord {
    /// Builds a full record (status, body and headers) from a response.
    pub fn from_http(response: &HttpResponse) -> Self {
        let headers = response
            .headers
            .iter()
            .map(|(k, v)| (k.to_lowercase(), Value::String(v.clone())))
            .collect::<Map<String, Value>>();

        Self {
            status: response.status_code,
            status_text: response.status_text.clone(),
            data: response.data(),
            headers: Some(headers),
        }
    }

    /// Builds a record carrying only the status line, as kept for 4xx responses.
    pub fn status_only(response: &HttpResponse) -> Self {
        Self {
            status: response.status_code,
            status_text: response.status_text.clone(),
            data: None,
            headers: None,
        }
    }

    /// Builds the record stored when a request could not be prepared for dispatch.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: 0,
            status_text: message.into(),
            data: None,
            headers: None,
        }
    }

    /// Whether this record describes a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Whether this record describes a request that never reached the network.
    pub fn is_failed(&self) -> bool {
        self.status == 0
    }
}
