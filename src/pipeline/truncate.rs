//! Truncation: bound extracted text before it is sent to a model.
//!
//! The cap counts Unicode scalar values (`char`s), so a cut never lands inside
//! a UTF-8 sequence. It may still split a word or a grapheme cluster.

use crate::config::FILE_LIMITS;

/// Cap `text` to `max_chars` characters.
///
/// Text at or under the cap is returned unchanged. Longer text keeps its first
/// `max_chars` characters followed by [`truncation_marker`].
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + 160);
            out.push_str(&text[..cut]);
            out.push_str(&truncation_marker(max_chars));
            out
        }
    }
}

/// [`truncate`] with the process-wide AI budget.
pub fn truncate_for_ai(text: &str) -> String {
    truncate(text, FILE_LIMITS.max_chars_for_ai)
}

/// The notice appended to truncated text.
pub fn truncation_marker(max_chars: usize) -> String {
    format!(
        "\n\n…[Content truncated at {} characters. The full text is stored but only this portion was sent to the AI.]",
        group_thousands(max_chars)
    )
}

/// `12000` → `12,000`.
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
