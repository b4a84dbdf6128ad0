//! Output types for extraction.

use crate::config::DocumentFormat;
use crate::error::ExtractError;
use serde::Serialize;

/// One extracted document, ready to hand to a model.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedDocument {
    /// File name as given by the source.
    pub name: String,
    pub format: DocumentFormat,
    /// Full extracted text. Never empty.
    pub text: String,
    /// `text` capped to the AI budget, with the truncation notice when cut.
    pub ai_text: String,
    /// Whether `ai_text` differs from `text`.
    pub truncated: bool,
    pub stats: DocumentStats,
}

/// Size and timing figures for one document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentStats {
    /// Source size in bytes.
    pub size_bytes: u64,
    /// Characters in `text`.
    pub char_count: usize,
    /// Characters in `ai_text`, notice included.
    pub ai_char_count: usize,
    /// `[Page N]` / `[Slide N]` markers in `text`; 0 for Word and plain text.
    pub sections: usize,
    /// Wall-clock time from sniffing to truncation.
    pub duration_ms: u64,
}

/// The outcome for one file of a batch.
#[derive(Debug)]
pub struct BatchItem {
    /// Position of the file in the input.
    pub index: usize,
    pub name: String,
    pub result: Result<PreparedDocument, ExtractError>,
}

impl BatchItem {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Serialisable view of a [`BatchItem`]; errors are rendered as their message.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BatchReport<'a> {
    Ok {
        index: usize,
        #[serde(flatten)]
        document: &'a PreparedDocument,
    },
    Error {
        index: usize,
        name: &'a str,
        error: String,
    },
}

impl<'a> From<&'a BatchItem> for BatchReport<'a> {
    fn from(item: &'a BatchItem) -> Self {
        match &item.result {
            Ok(document) => BatchReport::Ok {
                index: item.index,
                document,
            },
            Err(e) => BatchReport::Error {
                index: item.index,
                name: &item.name,
                error: e.to_string(),
            },
        }
    }
}

/// Count `[Page N]` / `[Slide N]` markers that start a line.
pub(crate) fn count_sections(text: &str) -> usize {
    text.lines()
        .filter(|line| {
            let rest = line
                .strip_prefix("[Page ")
                .or_else(|| line.strip_prefix("[Slide "));
            match rest.and_then(|r| r.strip_suffix(']')) {
                Some(n) => !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()),
                None => false,
            }
        })
        .count()
}
