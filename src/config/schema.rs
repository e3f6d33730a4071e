//! Configuration schema.
//!
//! Defines every user-configurable setting and its validation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Main configuration structure.
///
/// Read from the `"apex"` key of a settings document. Missing settings fall
/// back to their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApexConfig {
    /// Request timeout in milliseconds. Must be greater than 0.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Pause between consecutive requests of a sequential run, in milliseconds.
    ///
    /// Zero disables the pause.
    #[serde(default = "default_request_delay")]
    pub request_delay: u64,

    /// Whether to automatically follow HTTP redirects.
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,

    /// Maximum number of redirects to follow when `follow_redirects` is set.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Whether to validate SSL/TLS certificates.
    ///
    /// **Warning:** Disabling SSL validation can expose you to security risks.
    #[serde(default = "default_validate_ssl")]
    pub validate_ssl: bool,

    /// Headers added to every request unless the request sets them itself.
    #[serde(default = "default_headers")]
    pub default_headers: HashMap<String, String>,
}

impl Default for ApexConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            request_delay: default_request_delay(),
            follow_redirects: default_follow_redirects(),
            max_redirects: default_max_redirects(),
            validate_ssl: default_validate_ssl(),
            default_headers: default_headers(),
        }
    }
}

impl ApexConfig {
    /// Validates the configuration and returns errors if any settings are invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout == 0 {
            return Err("timeout must be greater than 0".to_string());
        }

        // request_delay and max_redirects may be 0

        Ok(())
    }

    /// Returns the timeout as a `Duration`.
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    /// Returns the inter-request delay as a `Duration`.
    pub fn request_delay_duration(&self) -> Duration {
        Duration::from_millis(self.request_delay)
    }

    /// Merges this configuration with another, using values from `other`.
    pub fn merge(&self, other: &ApexConfig) -> Self {
        Self {
            timeout: other.timeout,
            request_delay: other.request_delay,
            follow_redirects: other.follow_redirects,
            max_redirects: other.max_redirects,
            validate_ssl: other.validate_ssl,
            default_headers: other.default_headers.clone(),
        }
    }
}

// Default value functions for serde

fn default_timeout() -> u64 {
    30000 // 30 seconds in milliseconds
}

fn default_request_delay() -> u64 {
    500
}

fn default_follow_redirects() -> bool {
    true
}

fn default_max_redirects() -> u32 {
    10
}

fn default_validate_ssl() -> bool {
    true
}

fn default_headers() -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert(
        "User-Agent".to_string(),
        format!("apex/{}", env!("CARGO_PKG_VERSION")),
    );
    headers
}
