//! Lightweight Markdown for model-generated text.
//!
//! Summaries and chat replies come back as loosely formatted Markdown. This
//! module turns them into display blocks with a deliberately small grammar:
//! headings up to `###`, fenced code, `*`/`-`/`+` and `1.` lists, `---` rules,
//! single-line `> ` quotes, paragraphs, and `**bold**`, `*italic*`, `` `code` ``,
//! `~~strike~~` inside a line. It is not CommonMark; anything outside that
//! grammar is shown as text.
//!
//! ```rust
//! use edgequake_doc2text::markdown::{render, Block};
//!
//! let blocks: Vec<Block> = render("# Title\n\nSome *text*.").collect();
//! assert_eq!(blocks.len(), 3);
//! assert!(matches!(blocks[1], Block::Spacer));
//! ```

mod block;
mod inline;
mod render;

pub use block::{Block, Blocks, Recognizer, RECOGNIZERS};
pub use inline::{parse_inline, Inline};
pub use render::{to_html, to_plain_text};

/// Parse `content` into blocks, lazily.
pub fn render(content: &str) -> Blocks<'_> {
    Blocks::new(content)
}
