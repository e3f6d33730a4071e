//! HTTP request execution error types.
//!
//! Covers failures while preparing a request from its definition as well as
//! network, timeout and protocol failures of the call itself.

use crate::variables::VarError;
use std::fmt;

/// Errors that can occur while preparing or executing an HTTP request.
#[derive(Debug)]
pub enum RequestError {
    /// Network error occurred during request execution.
    ///
    /// This includes connection failures, DNS resolution errors,
    /// and other network-level issues.
    NetworkError(String),

    /// Request timed out before completion.
    Timeout,

    /// Invalid URL provided in the request.
    InvalidUrl(String),

    /// TLS/SSL error occurred during HTTPS connection.
    TlsError(String),

    /// Errors that occur when constructing the HTTP request or client.
    BuildError(String),

    /// A reference in the request could not be substituted.
    Substitution(VarError),

    /// The headers text is not a JSON object after substitution.
    InvalidHeaders(String),
}

impl RequestError {
    /// Whether the request failed before anything was sent.
    ///
    /// Such failures are recorded against the request; transport failures
    /// are only logged.
    pub fn is_preparation_error(&self) -> bool {
        matches!(
            self,
            RequestError::Substitution(_) | RequestError::InvalidHeaders(_)
        )
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            RequestError::Timeout => write!(f, "Request timed out"),
            RequestError::InvalidUrl(url) => write!(f, "Invalid URL: {}", url),
            RequestError::TlsError(msg) => write!(f, "TLS/SSL error: {}", msg),
            RequestError::BuildError(msg) => write!(f, "Request build error: {}", msg),
            RequestError::Substitution(err) => write!(f, "Substitution failed: {}", err),
            RequestError::InvalidHeaders(msg) => write!(f, "Invalid headers: {}", msg),
        }
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RequestError::Substitution(err) => Some(err),
            _ => None,
        }
    }
}

impl From<VarError> for RequestError {
    fn from(err: VarError) -> Self {
        RequestError::Substitution(err)
    }
}

/// Convert reqwest errors to RequestError.
#[cfg(feature = "native")]
impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RequestError::Timeout
        } else if err.is_builder() {
            RequestError::BuildError(err.to_string())
        } else if err.to_string().contains("certificate")
            || err.to_string().contains("TLS")
            || err.to_string().contains("SSL")
        {
            RequestError::TlsError(err.to_string())
        } else {
            RequestError::NetworkError(err.to_string())
        }
    }
}

/// Convert URL parsing errors to RequestError.
impl From<url::ParseError> for RequestError {
    fn from(err: url::ParseError) -> Self {
        RequestError::InvalidUrl(err.to_string())
    }
}
