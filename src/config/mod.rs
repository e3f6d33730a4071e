//! Configuration management.
//!
//! Configuration is loaded from a settings JSON document under the `"apex"`
//! key, merged with defaults and held in a process-wide singleton.

pub mod schema;

pub use schema::ApexConfig;

use log::warn;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::sync::RwLock;

/// Key under which settings are read from a settings document.
pub const SETTINGS_KEY: &str = "apex";

/// Global configuration instance.
static CONFIG: Lazy<RwLock<ApexConfig>> = Lazy::new(|| RwLock::new(ApexConfig::default()));

/// Loads configuration from a settings JSON value.
///
/// Reads the `"apex"` settings, merges them with defaults, validates the
/// result and updates the global configuration. Settings that fail to
/// deserialize are ignored with a warning.
///
/// # Example
///
/// ```no_run
/// use apex::config::load_config;
/// use serde_json::json;
///
/// let settings = json!({
///     "apex": {
///         "timeout": 60000,
///         "requestDelay": 0
///     }
/// });
///
/// let config = load_config(Some(settings)).unwrap();
/// assert_eq!(config.timeout, 60000);
/// ```
pub fn load_config(settings_json: Option<Value>) -> Result<ApexConfig, String> {
    let mut config = ApexConfig::default();

    if let Some(settings) = settings_json {
        if let Some(apex_settings) = settings.get(SETTINGS_KEY) {
            match serde_json::from_value::<ApexConfig>(apex_settings.clone()) {
                Ok(user_config) => {
                    config = config.merge(&user_config);
                }
                Err(e) => {
                    warn!("Failed to parse {} settings: {}. Using defaults.", SETTINGS_KEY, e);
                }
            }
        }
    }

    config
        .validate()
        .map_err(|e| format!("Invalid configuration: {}", e))?;

    if let Ok(mut global_config) = CONFIG.write() {
        *global_config = config.clone();
    }

    Ok(config)
}

/// Gets a clone of the current global configuration.
///
/// Returns the defaults if nothing has been loaded yet.
pub fn get_config() -> ApexConfig {
    CONFIG
        .read()
        .map(|c| c.clone())
        .unwrap_or_else(|_| ApexConfig::default())
}

/// Updates the global configuration in place.
///
/// Reverts to defaults if the update leaves the configuration invalid.
///
/// # Example
///
/// ```no_run
/// use apex::config::update_config;
///
/// update_config(|config| {
///     config.request_delay = 0;
/// });
/// ```
pub fn update_config<F>(updater: F)
where
    F: FnOnce(&mut ApexConfig),
{
    if let Ok(mut config) = CONFIG.write() {
        updater(&mut config);

        if let Err(e) = config.validate() {
            warn!("Configuration validation failed after update: {}", e);
            *config = ApexConfig::default();
        }
    }
}

/// Resets the configuration to defaults.
pub fn reset_config() {
    if let Ok(mut config) = CONFIG.write() {
        *config = ApexConfig::default();
    }
}
