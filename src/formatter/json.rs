//! JSON formatting for request arguments and headers.
//!
//! This module provides:
//! - Pretty-printing with 2-space indentation
//! - Validation
//! - Tolerant formatting of text that only becomes JSON once its `!name!`
//!   references are substituted

use crate::formatter::FormatError;
use crate::variables::token::reference_spans;
use serde::Serialize;
use serde_json::Value;

/// Prefix of the placeholders that stand in for references while formatting.
const PLACEHOLDER_PREFIX: &str = "__APEX_TOKEN_";

/// Formats JSON with pretty-printing using 2-space indentation.
///
/// Object keys keep their original order.
///
/// # Examples
///
/// ```
/// use apex::formatter::json::format_json_pretty;
///
/// let json = r#"{"name":"John","age":30}"#;
/// let formatted = format_json_pretty(json).unwrap();
/// assert_eq!(formatted, "{\n  \"name\": \"John\",\n  \"age\": 30\n}");
/// ```
pub fn format_json_pretty(json: &str) -> Result<String, FormatError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| FormatError::JsonError(e.to_string()))?;

    // Formatted output is usually ~1.5x the compact input
    let mut buf = Vec::with_capacity(json.len() + (json.len() / 2));

    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);

    value
        .serialize(&mut serializer)
        .map_err(|e| FormatError::JsonError(e.to_string()))?;

    String::from_utf8(buf).map_err(|e| FormatError::EncodingError(e.to_string()))
}

/// Validates whether a string is valid JSON.
///
/// # Examples
///
/// ```
/// use apex::formatter::json::validate_json;
///
/// assert!(validate_json(r#"{"valid": true}"#));
/// assert!(!validate_json("{invalid json}"));
/// ```
pub fn validate_json(json: &str) -> bool {
    serde_json::from_str::<Value>(json).is_ok()
}

/// Pretty-prints request text that may still contain unresolved references.
///
/// Valid JSON is formatted directly. Otherwise every reference is masked by
/// a placeholder (a JSON string where the reference stands for a value, bare
/// text where it sits inside a string literal), the masked text is formatted,
/// and the original reference text is put back. Text that cannot be
/// formatted either way is returned unchanged.
///
/// # Examples
///
/// ```
/// use apex::formatter::json::format_tolerant;
///
/// let formatted = format_tolerant(r#"{"id":!id!,"name":"!first:no-quotes! Smith"}"#);
/// assert_eq!(
///     formatted,
///     "{\n  \"id\": !id!,\n  \"name\": \"!first:no-quotes! Smith\"\n}"
/// );
///
/// assert_eq!(format_tolerant("not json"), "not json");
/// ```
pub fn format_tolerant(text: &str) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }

    if let Ok(formatted) = format_json_pretty(text) {
        return formatted;
    }

    let Some(masked) = Masked::new(text) else {
        return text.to_string();
    };

    format_json_pretty(&masked.text)
        .ok()
        .and_then(|formatted| masked.restore(formatted))
        .unwrap_or_else(|| text.to_string())
}

/// Text with its references swapped for placeholders.
#[derive(Debug)]
struct Masked {
    text: String,
    /// (placeholder as it appears in the masked text, original reference)
    placeholders: Vec<(String, String)>,
}

impl Masked {
    /// Masks every reference in `text`, or `None` if there are none to mask
    /// or the text already contains something that looks like a placeholder.
    fn new(text: &str) -> Option<Self> {
        let spans = reference_spans(text);
        if spans.is_empty() || text.contains(PLACEHOLDER_PREFIX) {
            return None;
        }

        let mut masked = String::with_capacity(text.len() + spans.len() * 8);
        let mut placeholders = Vec::with_capacity(spans.len());
        let mut state = StringState::default();
        let mut last_end = 0;

        for (i, span) in spans.into_iter().enumerate() {
            let between = &text[last_end..span.start];
            state.advance(between);
            masked.push_str(between);

            let placeholder = if state.in_string {
                format!("{}{}__", PLACEHOLDER_PREFIX, i)
            } else {
                format!("\"{}{}__\"", PLACEHOLDER_PREFIX, i)
            };

            masked.push_str(&placeholder);
            placeholders.push((placeholder, text[span.clone()].to_string()));
            last_end = span.end;
        }
        masked.push_str(&text[last_end..]);

        Some(Self {
            text: masked,
            placeholders,
        })
    }

    /// Puts the original references back into formatted output. Fails if
    /// formatting dropped a placeholder, e.g. through a duplicate key.
    fn restore(&self, mut formatted: String) -> Option<String> {
        for (placeholder, original) in &self.placeholders {
            let pos = formatted.find(placeholder.as_str())?;
            formatted.replace_range(pos..pos + placeholder.len(), original);
        }
        Some(formatted)
    }
}

/// Tracks whether a scan position is inside a JSON string literal.
#[derive(Debug, Default)]
struct StringState {
    in_string: bool,
    escaped: bool,
}

impl StringState {
    fn advance(&mut self, chunk: &str) {
        for b in chunk.bytes() {
            if self.escaped {
                self.escaped = false;
            } else if self.in_string && b == b'\\' {
                self.escaped = true;
            } else if b == b'"' {
                self.in_string = !self.in_string;
            }
        }
    }
}
