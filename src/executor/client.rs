//! The HTTP call capability and preparation of calls from definitions.
//!
//! The sequencer only depends on [`HttpClient`]; the reqwest-backed
//! implementation lives in `native`, and tests substitute their own.

use crate::executor::error::RequestError;
use crate::models::{HttpMethod, HttpResponse, RequestDefinition};
use crate::variables::{stringify, substitute_body, substitute_url, Scope};
use async_trait::async_trait;
use serde_json::Value;

/// A fully resolved HTTP call, ready to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpCall {
    pub method: HttpMethod,
    pub url: String,
    /// Header name/value pairs in the order they were written.
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpCall {
    /// Resolves a request definition against the saved values in `scope`.
    ///
    /// The URL is substituted with URL encoding, the headers and arguments
    /// text with body encoding. The headers text must then be empty or a
    /// JSON object; non-string header values are sent as their JSON text.
    /// Non-empty arguments become the body, and a body that parses as JSON
    /// gets `Content-Type: application/json` unless a content type is set.
    pub fn prepare(definition: &RequestDefinition, scope: &Scope) -> Result<Self, RequestError> {
        let url = substitute_url(&definition.url, scope)?;

        let headers_text = substitute_body(&definition.headers, scope)?;
        let mut headers = parse_headers(&headers_text)?;

        let arguments = substitute_body(&definition.arguments, scope)?;
        let body = if arguments.trim().is_empty() {
            None
        } else {
            if serde_json::from_str::<Value>(&arguments).is_ok()
                && !has_header(&headers, "content-type")
            {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
            }
            Some(arguments)
        };

        Ok(Self {
            method: definition.method,
            url,
            headers,
            body,
        })
    }

    /// Looks up a header value, ignoring case in the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Generic async HTTP capability.
///
/// Any response that arrives, whatever its status, is `Ok`; `Err` means no
/// response could be obtained.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn call(&self, call: &HttpCall) -> Result<HttpResponse, RequestError>;
}

fn parse_headers(text: &str) -> Result<Vec<(String, String)>, RequestError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value =
        serde_json::from_str(text).map_err(|e| RequestError::InvalidHeaders(e.to_string()))?;

    match value {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(name, value)| (name, stringify(&value)))
            .collect()),
        other => Err(RequestError::InvalidHeaders(format!(
            "expected a JSON object, found {}",
            other
        ))),
    }
}

fn has_header(headers: &[(String, String)], name: &str) -> bool {
    headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
}
