//! Inline spans.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Leftmost match wins; at one position the alternatives are tried in order,
/// so `**x**` is bold rather than an italic `*` pair.
static RE_INLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\*\*(.+?)\*\*|\*(.+?)\*|`(.+?)`|~~(.+?)~~)").unwrap());

/// A styled run of text. Spans do not nest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum Inline {
    Text(String),
    Bold(String),
    Italic(String),
    Code(String),
    Strikethrough(String),
}

impl Inline {
    /// The text without its markers.
    pub fn text(&self) -> &str {
        match self {
            Inline::Text(s)
            | Inline::Bold(s)
            | Inline::Italic(s)
            | Inline::Code(s)
            | Inline::Strikethrough(s) => s,
        }
    }
}

/// Split one line of text into spans, left to right.
///
/// Unmatched markers stay in the surrounding [`Inline::Text`]. Empty input
/// gives no spans.
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in RE_INLINE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            spans.push(Inline::Text(text[last..whole.start()].to_string()));
        }
        let span = if let Some(m) = caps.get(2) {
            Inline::Bold(m.as_str().to_string())
        } else if let Some(m) = caps.get(3) {
            Inline::Italic(m.as_str().to_string())
        } else if let Some(m) = caps.get(4) {
            Inline::Code(m.as_str().to_string())
        } else if let Some(m) = caps.get(5) {
            Inline::Strikethrough(m.as_str().to_string())
        } else {
            Inline::Text(whole.as_str().to_string())
        };
        spans.push(span);
        last = whole.end();
    }

    if last < text.len() {
        spans.push(Inline::Text(text[last..].to_string()));
    }
    spans
}
