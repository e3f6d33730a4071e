//! Saved value models.
//!
//! A saved value is a named piece of data that later requests can reference
//! with a `!name!` token. Values captured from a response become visible only
//! to requests positioned after the one that produced them; values entered by
//! hand are visible everywhere.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// From which point in the request list a saved value is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Availability {
    /// Entered by hand; visible to every request. Stored as `-1`.
    Always,

    /// Produced by the request at this index; visible to later indices only.
    AfterRequest(usize),
}

impl Availability {
    /// Whether a value with this availability may be read by the request at
    /// `request_index`.
    ///
    /// The comparison is strict: the producing request never sees its own
    /// output.
    pub fn is_visible_at(&self, request_index: usize) -> bool {
        match self {
            Availability::Always => true,
            Availability::AfterRequest(source) => *source < request_index,
        }
    }
}

impl From<i64> for Availability {
    fn from(raw: i64) -> Self {
        if raw < 0 {
            Availability::Always
        } else {
            Availability::AfterRequest(raw as usize)
        }
    }
}

impl From<Availability> for i64 {
    fn from(availability: Availability) -> Self {
        match availability {
            Availability::Always => -1,
            Availability::AfterRequest(source) => source as i64,
        }
    }
}

/// A stored value, keyed by its name in the saved-values map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedValue {
    /// The captured or entered data.
    pub data: Value,

    /// The `/`-separated path the data was extracted with; empty for values
    /// entered by hand.
    #[serde(default)]
    pub key: String,

    /// Visibility of the value within the request list.
    pub available_from: Availability,
}

/// A request to store a new saved value.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveConfig {
    /// Name to reference the value by. Must be ASCII alphanumeric and unused.
    pub name: String,

    /// The data to store.
    pub data: Value,

    /// Extraction path, empty for manual values.
    pub key: String,

    /// Visibility of the value.
    pub available_from: Availability,
}

impl SaveConfig {
    /// A value captured from the response of the request at `index`.
    pub fn from_response(
        name: impl Into<String>,
        key: impl Into<String>,
        data: Value,
        index: usize,
    ) -> Self {
        Self {
            name: name.into(),
            data,
            key: key.into(),
            available_from: Availability::AfterRequest(index),
        }
    }

    /// A value entered by hand, visible to every request.
    pub fn manual(name: impl Into<String>, data: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            key: String::new(),
            available_from: Availability::Always,
        }
    }

    /// Splits the config into the map key and the stored value.
    pub fn into_entry(self) -> (String, SavedValue) {
        (
            self.name,
            SavedValue {
                data: self.data,
                key: self.key,
                available_from: self.available_from,
            },
        )
    }
}
