//! HTTP request execution configuration.
//!
//! Per-client and per-run settings, defaulted from the global configuration.

use crate::config::get_config;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Configuration for the HTTP client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,

    /// Whether to follow redirects.
    pub follow_redirects: bool,

    /// Maximum redirects followed when `follow_redirects` is set.
    pub max_redirects: u32,

    /// Whether to validate TLS certificates.
    pub validate_ssl: bool,

    /// Headers added to every request that does not set them itself.
    pub default_headers: HashMap<String, String>,
}

impl ExecutionConfig {
    /// Creates an ExecutionConfig from the global configuration.
    pub fn from_global_config() -> Self {
        let global_config = get_config();
        Self {
            timeout_ms: global_config.timeout,
            follow_redirects: global_config.follow_redirects,
            max_redirects: global_config.max_redirects,
            validate_ssl: global_config.validate_ssl,
            default_headers: global_config.default_headers,
        }
    }

    /// Returns the timeout as a `Duration`.
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self::from_global_config()
    }
}

/// Configuration for sequential runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Pause between consecutive requests of a sequential run.
    pub request_delay: Duration,
}

impl RunConfig {
    pub fn new(request_delay: Duration) -> Self {
        Self { request_delay }
    }

    /// Creates a RunConfig from the global configuration.
    pub fn from_global_config() -> Self {
        Self {
            request_delay: get_config().request_delay_duration(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::from_global_config()
    }
}
