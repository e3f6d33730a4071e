//! Producer-side validation of request fields and saved-value names.
//!
//! URL and JSON checks are run before a definition is submitted; the list
//! manager does not repeat them. Name checks run again at insertion time.

use super::error::WorkflowError;
use crate::models::SavedValue;
use crate::variables::token::{is_valid_name, reference_spans, tokens, EncodingMode, TokenContext};
use crate::variables::{substitute_url, Scope};
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;
use url::Url;

/// Errors found when validating a request before submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The URL is malformed, not http(s), or has an implausible host.
    InvalidUrl(String),

    /// The arguments or headers text is not JSON once references are masked.
    InvalidJson {
        /// Which field failed, e.g. `arguments`
        field: String,
        /// Parser message
        message: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            ValidationError::InvalidJson { field, message } => {
                write!(f, "Invalid JSON in {}: {}", field, message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Checks a request URL against the saved values visible to it.
///
/// Visible references are substituted first. A URL consisting of a single
/// `raw` reference is validated on the value it resolves to.
///
/// # Examples
///
/// ```
/// use apex::variables::Scope;
/// use apex::workflow::validate_url;
///
/// let scope = Scope::new();
/// assert!(validate_url("https://httpbin.org/get", &scope).is_ok());
/// assert!(validate_url("ftp://httpbin.org", &scope).is_err());
/// assert!(validate_url("http://nohost", &scope).is_err());
/// ```
pub fn validate_url(url: &str, scope: &Scope) -> Result<(), ValidationError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidUrl("URL is empty".to_string()));
    }

    let resolved = substitute_url(trimmed, scope)
        .map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;

    if is_single_raw_reference(trimmed) && resolved == trimmed {
        return Err(ValidationError::InvalidUrl(format!(
            "'{}' does not resolve to a saved value",
            trimmed
        )));
    }

    let parsed = Url::parse(&resolved).map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ValidationError::InvalidUrl(format!(
                "Unsupported scheme '{}'",
                other
            )))
        }
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| ValidationError::InvalidUrl("URL has no host".to_string()))?;

    if !is_plausible_host(host) {
        return Err(ValidationError::InvalidUrl(format!(
            "'{}' is not a valid host",
            host
        )));
    }

    Ok(())
}

/// Checks that arguments or headers text is JSON once references are masked.
///
/// Empty text is valid.
pub fn validate_json_field(field: &str, text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Ok(());
    }

    let mut masked = String::with_capacity(text.len());
    let mut last_end = 0;
    for span in reference_spans(text) {
        masked.push_str(&text[last_end..span.start]);
        masked.push('0');
        last_end = span.end;
    }
    masked.push_str(&text[last_end..]);

    serde_json::from_str::<serde_json::Value>(&masked)
        .map(|_| ())
        .map_err(|e| ValidationError::InvalidJson {
            field: field.to_string(),
            message: e.to_string(),
        })
}

/// Checks a saved-value name against the naming rule and the existing store.
pub fn validate_variable_name(
    name: &str,
    saved: &BTreeMap<String, SavedValue>,
) -> Result<(), WorkflowError> {
    if !is_valid_name(name) {
        return Err(WorkflowError::InvalidName(name.to_string()));
    }

    if saved.contains_key(name) {
        return Err(WorkflowError::NameConflict(name.to_string()));
    }

    Ok(())
}

fn is_single_raw_reference(url: &str) -> bool {
    let mut found = tokens(url, TokenContext::Url);
    match (found.next(), found.next()) {
        (Some(token), None) => token.span == (0..url.len()) && token.mode == EncodingMode::Raw,
        _ => false,
    }
}

fn is_plausible_host(host: &str) -> bool {
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    host == "localhost" || bare.parse::<IpAddr>().is_ok() || host.contains('.')
}
