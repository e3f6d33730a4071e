//! Variable substitution engine.
//!
//! Replaces `!name!` tokens in request text with the values visible in a
//! [`Scope`]. Body and header text and URL text share token matching and
//! lookup and differ only in how the resolved value is encoded:
//!
//! - **Body/header text**: structured values are inserted as JSON. Strings
//!   are quoted unless the token carries `no-quotes`. Numbers, booleans and
//!   null are inserted as their JSON text.
//! - **URL text**: the value is stringified and percent-encoded unless the
//!   token carries `raw`. ASCII letters, digits and `-_.!~*'()` are left
//!   as they are, the same set a browser's `encodeURIComponent` keeps.
//!
//! A rewrite modifier is applied to the stringified value before the
//! quoting or encoding step. Tokens naming a value that is not in scope are
//! copied through unchanged.

use super::scope::Scope;
use super::token::{tokens, EncodingMode, Rewrite, Token, TokenContext};
use super::VarError;
use regex::Regex;
use serde_json::Value;

/// Substitutes tokens in arguments or headers JSON text.
///
/// # Examples
///
/// ```
/// use apex::models::{Availability, SavedValue};
/// use apex::variables::{substitute_body, Scope};
/// use serde_json::json;
///
/// let mut scope = Scope::new();
/// scope.insert("x", SavedValue {
///     data: json!("hello"),
///     key: String::new(),
///     available_from: Availability::Always,
/// });
///
/// let result = substitute_body(r#"{"greeting": !x!}"#, &scope).unwrap();
/// assert_eq!(result, r#"{"greeting": "hello"}"#);
/// ```
pub fn substitute_body(text: &str, scope: &Scope) -> Result<String, VarError> {
    substitute(text, scope, TokenContext::Body)
}

/// Substitutes tokens in a request URL.
///
/// # Examples
///
/// ```
/// use apex::models::{Availability, SavedValue};
/// use apex::variables::{substitute_url, Scope};
/// use serde_json::json;
///
/// let mut scope = Scope::new();
/// scope.insert("x", SavedValue {
///     data: json!("a b/c"),
///     key: String::new(),
///     available_from: Availability::Always,
/// });
///
/// assert_eq!(substitute_url("https://h/!x!", &scope).unwrap(), "https://h/a%20b%2Fc");
/// assert_eq!(substitute_url("https://h/!x:raw!", &scope).unwrap(), "https://h/a b/c");
/// ```
pub fn substitute_url(text: &str, scope: &Scope) -> Result<String, VarError> {
    substitute(text, scope, TokenContext::Url)
}

fn substitute(text: &str, scope: &Scope, context: TokenContext) -> Result<String, VarError> {
    // Fast path: no token can start without a marker
    if !text.contains('!') {
        return Ok(text.to_string());
    }

    let mut result = String::with_capacity(text.len() + (text.len() / 4));
    let mut last_match_end = 0;

    for token in tokens(text, context) {
        result.push_str(&text[last_match_end..token.span.start]);

        match scope.get(token.name) {
            Some(saved) => result.push_str(&render(&saved.data, &token, context)?),
            None => result.push_str(token.text),
        }

        last_match_end = token.span.end;
    }

    result.push_str(&text[last_match_end..]);
    Ok(result)
}

/// Encodes one resolved value for insertion in place of `token`.
fn render(value: &Value, token: &Token<'_>, context: TokenContext) -> Result<String, VarError> {
    let mut text = stringify(value);
    if let Some(rewrite) = token.rewrite {
        text = apply_rewrite(&text, rewrite)?;
    }

    let encoded = match context {
        TokenContext::Body => match value {
            Value::String(_) if token.mode != EncodingMode::NoQuotes => {
                Value::String(text).to_string()
            }
            _ => text,
        },
        TokenContext::Url => match token.mode {
            EncodingMode::Raw => text,
            _ => encode_component(&text),
        },
    };

    Ok(encoded)
}

/// Escapes that `urlencoding` produces for characters a URL component may
/// carry literally.
const UNESCAPED: [(&str, &str); 5] = [
    ("%21", "!"),
    ("%27", "'"),
    ("%28", "("),
    ("%29", ")"),
    ("%2A", "*"),
];

fn encode_component(text: &str) -> String {
    let mut encoded = urlencoding::encode(text).into_owned();
    for (escape, literal) in UNESCAPED {
        if encoded.contains(escape) {
            encoded = encoded.replace(escape, literal);
        }
    }
    encoded
}

/// Plain text form of a value: strings as-is, everything else as JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Replaces every match of the rewrite pattern in `text`.
fn apply_rewrite(text: &str, rewrite: Rewrite<'_>) -> Result<String, VarError> {
    let re = Regex::new(rewrite.pattern).map_err(|e| VarError::InvalidPattern {
        pattern: rewrite.pattern.to_string(),
        message: e.to_string(),
    })?;

    Ok(re.replace_all(text, rewrite.replacement).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Availability, SavedValue};
    use serde_json::json;

    fn create_test_scope() -> Scope {
        let mut scope = Scope::new();
        let entries = [
            ("greeting", json!("hello")),
            ("url", json!("https://example.com")),
            ("path", json!("a b/c")),
            ("id", json!(42)),
            ("flag", json!(true)),
            ("user", json!({"name": "Ada", "roles": ["admin"]})),
            ("list", json!([1, 2, 3])),
            ("quoted", json!("say \"hi\"")),
        ];

        for (name, data) in entries {
            scope.insert(
                name,
                SavedValue {
                    data,
                    key: String::new(),
                    available_from: Availability::Always,
                },
            );
        }

        scope
    }

    #[test]
    fn test_body_string_is_quoted() {
        let scope = create_test_scope();
        let result = substitute_body(r#"{"msg": !greeting!}"#, &scope).unwrap();

        assert_eq!(result, r#"{"msg": "hello"}"#);
        let parsed: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["msg"], "hello");
    }

    #[test]
    fn test_body_no_quotes_inside_string() {
        let scope = create_test_scope();
        let result = substitute_body(r#"{"msg": "!greeting:no-quotes! world"}"#, &scope).unwrap();

        assert_eq!(result, r#"{"msg": "hello world"}"#);
    }

    #[test]
    fn test_body_structured_values_are_json() {
        let scope = create_test_scope();
        let result = substitute_body(r#"{"user": !user!, "list": !list!}"#, &scope).unwrap();

        let parsed: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["user"]["name"], "Ada");
        assert_eq!(parsed["list"], json!([1, 2, 3]));
    }

    #[test]
    fn test_body_scalars_inserted_bare() {
        let scope = create_test_scope();
        let result = substitute_body(r#"{"id": !id!, "on": !flag!}"#, &scope).unwrap();

        assert_eq!(result, r#"{"id": 42, "on": true}"#);
    }

    #[test]
    fn test_body_string_quotes_are_escaped() {
        let scope = create_test_scope();
        let result = substitute_body(r#"{"q": !quoted!}"#, &scope).unwrap();

        let parsed: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["q"], "say \"hi\"");
    }

    #[test]
    fn test_body_rewrite_before_quoting() {
        let scope = create_test_scope();
        let result = substitute_body(r#"{"url": !url:https:http!}"#, &scope).unwrap();

        assert_eq!(result, r#"{"url": "http://example.com"}"#);
    }

    #[test]
    fn test_body_rewrite_removal() {
        let scope = create_test_scope();
        let result = substitute_body(r#"{"url": !url:https:!}"#, &scope).unwrap();

        assert_eq!(result, r#"{"url": "://example.com"}"#);
    }

    #[test]
    fn test_body_no_quotes_with_rewrite() {
        let scope = create_test_scope();
        let result =
            substitute_body(r#"{"host": "!url:no-quotes:[^/]+//:!"}"#, &scope).unwrap();

        assert_eq!(result, r#"{"host": "example.com"}"#);
    }

    #[test]
    fn test_url_encoded_by_default() {
        let scope = create_test_scope();
        let result = substitute_url("https://httpbin.org/anything/!path!", &scope).unwrap();

        assert_eq!(result, "https://httpbin.org/anything/a%20b%2Fc");
    }

    #[test]
    fn test_url_keeps_component_safe_punctuation() {
        let mut scope = create_test_scope();
        scope.insert(
            "title",
            SavedValue {
                data: json!("it's (a)*b!"),
                key: String::new(),
                available_from: Availability::Always,
            },
        );

        assert_eq!(
            substitute_url("https://h/?t=!title!", &scope).unwrap(),
            "https://h/?t=it's%20(a)*b!"
        );

        // A literal escape sequence in the value is itself escaped
        scope.insert(
            "escaped",
            SavedValue {
                data: json!("%21"),
                key: String::new(),
                available_from: Availability::Always,
            },
        );
        assert_eq!(
            substitute_url("https://h/!escaped!", &scope).unwrap(),
            "https://h/%2521"
        );
    }

    #[test]
    fn test_url_raw() {
        let scope = create_test_scope();

        assert_eq!(substitute_url("!url:raw!", &scope).unwrap(), "https://example.com");
        assert_eq!(
            substitute_url("https://h/!path:raw!", &scope).unwrap(),
            "https://h/a b/c"
        );
    }

    #[test]
    fn test_url_raw_with_rewrite() {
        let mut scope = create_test_scope();
        scope.insert(
            "target",
            SavedValue {
                data: json!("https://httpbin.org/post"),
                key: "url".to_string(),
                available_from: Availability::Always,
            },
        );

        let result = substitute_url("!target:raw:post:get!", &scope).unwrap();
        assert_eq!(result, "https://httpbin.org/get");
    }

    #[test]
    fn test_url_structured_value_is_json_then_encoded() {
        let scope = create_test_scope();
        let result = substitute_url("https://h/?l=!list!", &scope).unwrap();

        assert_eq!(result, "https://h/?l=%5B1%2C2%2C3%5D");
    }

    #[test]
    fn test_url_number() {
        let scope = create_test_scope();
        assert_eq!(
            substitute_url("https://h/users/!id!", &scope).unwrap(),
            "https://h/users/42"
        );
    }

    #[test]
    fn test_unknown_variable_left_verbatim() {
        let scope = create_test_scope();

        let body = r#"{"a": !missing!, "b": !greeting!}"#;
        assert_eq!(
            substitute_body(body, &scope).unwrap(),
            r#"{"a": !missing!, "b": "hello"}"#
        );

        let url = "https://h/!missing:raw!";
        assert_eq!(substitute_url(url, &scope).unwrap(), url);
    }

    #[test]
    fn test_no_tokens_unchanged() {
        let scope = create_test_scope();
        assert_eq!(substitute_body("", &scope).unwrap(), "");
        assert_eq!(
            substitute_body(r#"{"a": "wow!"}"#, &scope).unwrap(),
            r#"{"a": "wow!"}"#
        );
    }

    #[test]
    fn test_same_variable_twice() {
        let scope = create_test_scope();
        let result = substitute_body("[!id!, !id!]", &scope).unwrap();
        assert_eq!(result, "[42, 42]");
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let scope = create_test_scope();
        let result = substitute_body("!url:(:x!", &scope);

        assert!(matches!(result, Err(VarError::InvalidPattern { .. })));
    }

    #[test]
    fn test_invalid_pattern_ignored_for_unknown_variable() {
        let scope = create_test_scope();
        assert_eq!(substitute_body("!nope:(:x!", &scope).unwrap(), "!nope:(:x!");
    }

    #[test]
    fn test_stringify() {
        assert_eq!(stringify(&json!("text")), "text");
        assert_eq!(stringify(&json!(1.5)), "1.5");
        assert_eq!(stringify(&json!(null)), "null");
        assert_eq!(stringify(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
