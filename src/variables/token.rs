//! Token scanner for saved-value references.
//!
//! A token references a saved value by name and optionally carries modifiers:
//!
//! ```text
//! !name!
//! !name:no-quotes!                  (body and header text)
//! !name:raw!                        (URL text)
//! !name:pattern:replacement!
//! !name:no-quotes:pattern:replacement!
//! !name:raw:pattern:replacement!
//! ```
//!
//! The name is one or more ASCII alphanumeric characters. Modifiers are
//! separated by `:` and may not themselves contain `:` or `!`. With two or
//! more modifiers the last two are always the rewrite pattern and its
//! replacement; a keyword may only appear before them. A lone modifier must
//! be the keyword of the context. Anything that does not fit is not a token
//! and stays in the text untouched.

use std::ops::Range;

/// Where a token appears, which decides the keyword it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenContext {
    /// Arguments and headers JSON text. Accepts `no-quotes`.
    Body,
    /// Request URL. Accepts `raw`.
    Url,
}

impl TokenContext {
    /// The encoding keyword valid in this context.
    pub fn keyword(&self) -> &'static str {
        match self {
            TokenContext::Body => "no-quotes",
            TokenContext::Url => "raw",
        }
    }

    fn keyword_mode(&self) -> EncodingMode {
        match self {
            TokenContext::Body => EncodingMode::NoQuotes,
            TokenContext::Url => EncodingMode::Raw,
        }
    }
}

/// How a resolved value is encoded when it is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingMode {
    /// Body: strings are quoted. URL: the value is percent-encoded.
    Default,
    /// Body only: strings are inserted without surrounding quotes.
    NoQuotes,
    /// URL only: the value is inserted without percent-encoding.
    Raw,
}

/// A regular-expression rewrite applied to the value before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rewrite<'a> {
    /// Regular expression, matched globally.
    pub pattern: &'a str,
    /// Replacement text; may be empty.
    pub replacement: &'a str,
}

/// A recognised token within a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    /// Byte range of the whole token, delimiters included.
    pub span: Range<usize>,
    /// The token exactly as written.
    pub text: &'a str,
    /// The referenced saved-value name.
    pub name: &'a str,
    /// Encoding applied on insertion.
    pub mode: EncodingMode,
    /// Optional rewrite of the value.
    pub rewrite: Option<Rewrite<'a>>,
}

/// Lazy iterator over the tokens of a string, left to right.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    text: &'a str,
    context: TokenContext,
    pos: usize,
}

/// Returns an iterator over the tokens in `text`.
///
/// # Examples
///
/// ```
/// use apex::variables::token::{tokens, EncodingMode, TokenContext};
///
/// let found: Vec<_> = tokens(r#"{"url": !url:raw!}"#, TokenContext::Body).collect();
/// assert!(found.is_empty()); // `raw` is not a body keyword
///
/// let found: Vec<_> = tokens("https://host/!id:raw!", TokenContext::Url).collect();
/// assert_eq!(found[0].name, "id");
/// assert_eq!(found[0].mode, EncodingMode::Raw);
/// ```
pub fn tokens(text: &str, context: TokenContext) -> Tokens<'_> {
    Tokens {
        text,
        context,
        pos: 0,
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.text.as_bytes();

        while self.pos < bytes.len() {
            let start = match self.text[self.pos..].find('!') {
                Some(offset) => self.pos + offset,
                None => {
                    self.pos = bytes.len();
                    return None;
                }
            };

            if let Scan::Complete(raw) = scan_at(bytes, start) {
                if let Some(token) = self.classify(start, raw) {
                    self.pos = token.span.end;
                    return Some(token);
                }
            }

            self.pos = start + 1;
        }

        None
    }
}

impl<'a> Tokens<'a> {
    fn classify(&self, start: usize, raw: RawToken) -> Option<Token<'a>> {
        let text: &'a str = self.text;
        let modifiers: Vec<&'a str> = raw
            .modifiers
            .iter()
            .map(|range| &text[range.clone()])
            .collect();
        let keyword = self.context.keyword();

        let (mode, rewrite) = match modifiers.as_slice() {
            [] => (EncodingMode::Default, None),
            [single] if *single == keyword => (self.context.keyword_mode(), None),
            [_] => return None,
            [leading @ .., pattern, replacement] => {
                let mode = if leading.contains(&keyword) {
                    self.context.keyword_mode()
                } else {
                    EncodingMode::Default
                };
                (
                    mode,
                    Some(Rewrite {
                        pattern: *pattern,
                        replacement: *replacement,
                    }),
                )
            }
        };

        Some(Token {
            span: start..raw.end,
            text: &text[start..raw.end],
            name: &text[start + 1..raw.name_end],
            mode,
            rewrite,
        })
    }
}

/// Byte spans of every saved-value reference in `text`, in either context.
///
/// Besides complete tokens this also reports unterminated `!name` references,
/// which the tolerant JSON formatter has to mask as well.
pub fn reference_spans(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('!') {
        let start = pos + offset;
        match scan_at(bytes, start) {
            Scan::Complete(raw) => {
                spans.push(start..raw.end);
                pos = raw.end;
            }
            Scan::Bare { name_end } => {
                spans.push(start..name_end);
                pos = name_end;
            }
            Scan::NotAToken => pos = start + 1,
        }

        if pos >= bytes.len() {
            break;
        }
    }

    spans
}

/// Whether `name` is a valid saved-value name.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[derive(Debug)]
struct RawToken {
    end: usize,
    name_end: usize,
    modifiers: Vec<Range<usize>>,
}

#[derive(Debug)]
enum Scan {
    Complete(RawToken),
    Bare { name_end: usize },
    NotAToken,
}

/// Scans a token starting at the `!` at `start`.
fn scan_at(bytes: &[u8], start: usize) -> Scan {
    let mut i = start + 1;
    while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
        i += 1;
    }

    let name_end = i;
    if name_end == start + 1 {
        return Scan::NotAToken;
    }

    let mut modifiers = Vec::new();
    loop {
        match bytes.get(i) {
            Some(b'!') => {
                return Scan::Complete(RawToken {
                    end: i + 1,
                    name_end,
                    modifiers,
                })
            }
            Some(b':') => {
                let modifier_start = i + 1;
                i = modifier_start;
                while i < bytes.len() && bytes[i] != b':' && bytes[i] != b'!' {
                    i += 1;
                }
                if i >= bytes.len() {
                    return Scan::Bare { name_end };
                }
                modifiers.push(modifier_start..i);
            }
            _ => return Scan::Bare { name_end },
        }
    }
}
