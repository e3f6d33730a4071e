//! Scope resolution.
//!
//! The scope of a request is the set of saved values it may reference. A
//! value captured from request `i` is visible to requests `i + 1` onward;
//! manually entered values are visible everywhere. Scopes are computed fresh
//! before each execution and never cached, so a value refreshed by an earlier
//! step of a sequential run is seen by the steps after it.

use crate::models::SavedValue;
use std::collections::BTreeMap;

/// The saved values visible to one request, by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    values: BTreeMap<String, SavedValue>,
}

impl Scope {
    /// Creates an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value to the scope, replacing any value of the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: SavedValue) {
        self.values.insert(name.into(), value);
    }

    /// Looks up a value by exact name. `None` means the name is not visible.
    pub fn get(&self, name: &str) -> Option<&SavedValue> {
        self.values.get(name)
    }

    /// Whether a value of this name is visible.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Names of all visible values, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Computes the scope of the request at `request_index`.
///
/// Includes every saved value whose availability index is strictly less
/// than `request_index`, plus all manually entered values.
pub fn compute_scope(saved: &BTreeMap<String, SavedValue>, request_index: usize) -> Scope {
    let values = saved
        .iter()
        .filter(|(_, value)| value.available_from.is_visible_at(request_index))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    Scope { values }
}
