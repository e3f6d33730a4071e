//! Request definition models.
//!
//! A request definition is the user-authored form of a request: the URL,
//! method, and the raw arguments/headers text. The text fields may contain
//! `!name!` tokens and are only turned into a concrete HTTP call at run time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// HTTP request method.
///
/// Only the methods a workflow can author are represented. Written lowercase
/// in workflow files and read back in any case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum HttpMethod {
    /// HTTP GET method - retrieve a resource
    #[default]
    #[serde(rename = "get")]
    GET,
    /// HTTP HEAD method - retrieve headers only
    #[serde(rename = "head")]
    HEAD,
    /// HTTP POST method - submit data to create a resource
    #[serde(rename = "post")]
    POST,
    /// HTTP PUT method - replace a resource
    #[serde(rename = "put")]
    PUT,
    /// HTTP DELETE method - remove a resource
    #[serde(rename = "delete")]
    DELETE,
    /// HTTP OPTIONS method - describe communication options
    #[serde(rename = "options")]
    OPTIONS,
    /// HTTP PATCH method - partially modify a resource
    #[serde(rename = "patch")]
    PATCH,
}

impl HttpMethod {
    /// Returns the string representation of the HTTP method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::PATCH => "PATCH",
        }
    }

    /// Parses a string into an HttpMethod, ignoring case.
    ///
    /// # Returns
    ///
    /// `Some(HttpMethod)` if the string is a supported method, `None` otherwise.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "HEAD" => Some(HttpMethod::HEAD),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            "PATCH" => Some(HttpMethod::PATCH),
            _ => None,
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        HttpMethod::parse(&value).ok_or_else(|| format!("unsupported HTTP method '{}'", value))
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single step of a workflow as the user authored it.
///
/// Definitions are never mutated in place: editing produces a new value with
/// a fresh `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDefinition {
    /// Opaque unique identifier, stored as `identifier` in workflow files.
    #[serde(rename = "identifier")]
    pub id: String,

    /// Target URL, possibly containing tokens.
    pub url: String,

    /// HTTP method.
    pub method: HttpMethod,

    /// JSON text of the request payload, possibly containing tokens.
    #[serde(default)]
    pub arguments: String,

    /// JSON text of an object of request headers, possibly containing tokens.
    #[serde(default)]
    pub headers: String,
}

impl RequestDefinition {
    /// Creates a definition with a freshly generated identifier and empty
    /// arguments and headers.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url: url.into(),
            method,
            arguments: String::new(),
            headers: String::new(),
        }
    }

    /// Sets the arguments text.
    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = arguments.into();
        self
    }

    /// Sets the headers text.
    pub fn with_headers(mut self, headers: impl Into<String>) -> Self {
        self.headers = headers.into();
        self
    }

    /// Returns a copy of this definition carrying a new identifier.
    pub fn with_new_id(&self) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ..self.clone()
        }
    }
}
