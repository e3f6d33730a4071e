//! Value extraction from stored responses.
//!
//! Paths are `/`-separated: object members are addressed by name and array
//! elements by decimal index, e.g. `headers/X-Amzn-Trace-Id` or `items/0/id`.
//! Extraction never fails loudly; a path that does not resolve yields `None`.

use crate::models::ResponseRecord;
use serde_json::Value;

/// Extracts the value at `key` from a response record's data.
///
/// # Examples
///
/// ```
/// use apex::models::ResponseRecord;
/// use apex::variables::extract_nested_response_data;
/// use serde_json::json;
///
/// let record = ResponseRecord {
///     status: 200,
///     status_text: "OK".to_string(),
///     data: Some(json!({"user": {"ids": [7, 8]}})),
///     headers: None,
/// };
///
/// assert_eq!(extract_nested_response_data("user/ids/1", &record), Some(json!(8)));
/// assert_eq!(extract_nested_response_data("user/missing", &record), None);
/// ```
pub fn extract_nested_response_data(key: &str, record: &ResponseRecord) -> Option<Value> {
    record.data.as_ref().and_then(|data| extract_path(key, data))
}

/// Extracts the value at `key` from arbitrary JSON data.
pub fn extract_path(key: &str, data: &Value) -> Option<Value> {
    if key.is_empty() {
        return None;
    }

    let mut current = data;
    for segment in key.split('/') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current.clone())
}

/// Lists every path that [`extract_path`] can resolve in `data`.
///
/// Parents are listed before their children, in document order.
pub fn response_keys(data: &Value) -> Vec<String> {
    let mut keys = Vec::new();
    collect_keys(data, "", &mut keys);
    keys
}

fn collect_keys(value: &Value, stub: &str, keys: &mut Vec<String>) {
    let children: Vec<(String, &Value)> = match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => return,
    };

    for (segment, child) in children {
        let next = if stub.is_empty() {
            segment
        } else {
            format!("{}/{}", stub, segment)
        };

        keys.push(next.clone());
        collect_keys(child, &next, keys);
    }
}
