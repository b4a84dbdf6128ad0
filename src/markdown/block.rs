//! Block-level parsing.
//!
//! One forward pass over the lines. Each line is offered to [`RECOGNIZERS`]
//! top to bottom and the first one that claims it parses a block, consuming
//! as many lines as that block spans. The order is significant: the paragraph
//! recognizer claims everything, and a `***` line must reach the rule
//! recognizer before the list recognizer sees it.

use super::inline::{parse_inline, Inline};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,3})\s+(.*)$").unwrap());
static RE_RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(-{3,}|\*{3,}|_{3,})$").unwrap());
static RE_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[*\-+]\s+").unwrap());
static RE_NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+\.\s+").unwrap());

const FENCE: &str = "```";
const QUOTE: &str = "> ";

/// A display block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// `#`, `##` or `###`.
    Heading { level: u8, content: Vec<Inline> },
    /// Lines between fences, verbatim. `language` is the text after the
    /// opening fence, when present.
    FencedCode {
        language: Option<String>,
        lines: Vec<String>,
    },
    /// Consecutive items of one marker class.
    List { ordered: bool, items: Vec<Vec<Inline>> },
    HorizontalRule,
    /// A single `> ` line.
    Blockquote { content: Vec<Inline> },
    /// Consecutive plain lines joined with spaces.
    Paragraph { content: Vec<Inline> },
    /// A blank line after the first block.
    Spacer,
}

/// Lazy iterator over the blocks of a Markdown text.
///
/// Created by [`super::render`]. Calling `render` again on the same input
/// yields the same sequence.
#[derive(Debug, Clone)]
pub struct Blocks<'a> {
    lines: Vec<&'a str>,
    pos: usize,
    emitted: bool,
}

impl<'a> Blocks<'a> {
    pub(crate) fn new(content: &'a str) -> Self {
        let lines = if content.is_empty() {
            Vec::new()
        } else {
            content
                .split('\n')
                .map(|line| line.strip_suffix('\r').unwrap_or(line))
                .collect()
        };
        Self {
            lines,
            pos: 0,
            emitted: false,
        }
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<&'a str> {
        let line = self.peek()?;
        self.pos += 1;
        Some(line)
    }
}

impl Iterator for Blocks<'_> {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        while let Some(line) = self.peek() {
            let recognizer = RECOGNIZERS
                .iter()
                .find(|r| (r.claims)(line))
                .unwrap_or(&RECOGNIZERS[RECOGNIZERS.len() - 1]);
            if let Some(block) = (recognizer.parse)(self) {
                self.emitted = true;
                return Some(block);
            }
        }
        None
    }
}

// ── Recognizers ──────────────────────────────────────────────────────────

/// A block type: which lines start it and how it is consumed.
///
/// `parse` is only called when `claims` accepted the current line, and it
/// always consumes at least that line.
pub struct Recognizer {
    pub name: &'static str,
    pub claims: fn(&str) -> bool,
    parse: for<'a> fn(&mut Blocks<'a>) -> Option<Block>,
}

const PARAGRAPH: Recognizer = Recognizer {
    name: "paragraph",
    claims: |_| true,
    parse: parse_paragraph,
};

/// Block recognizers in precedence order.
pub static RECOGNIZERS: [Recognizer; 8] = [
    Recognizer {
        name: "fenced_code",
        claims: is_fence,
        parse: parse_fence,
    },
    Recognizer {
        name: "heading",
        claims: |line| RE_HEADING.is_match(line),
        parse: parse_heading,
    },
    Recognizer {
        name: "horizontal_rule",
        claims: |line| RE_RULE.is_match(line.trim()),
        parse: parse_rule,
    },
    Recognizer {
        name: "bullet_list",
        claims: |line| RE_BULLET.is_match(line),
        parse: |blocks| Some(parse_list(blocks, &RE_BULLET, false)),
    },
    Recognizer {
        name: "numbered_list",
        claims: |line| RE_NUMBERED.is_match(line),
        parse: |blocks| Some(parse_list(blocks, &RE_NUMBERED, true)),
    },
    Recognizer {
        name: "blockquote",
        claims: |line| line.starts_with(QUOTE),
        parse: parse_quote,
    },
    Recognizer {
        name: "blank",
        claims: |line| line.trim().is_empty(),
        parse: parse_blank,
    },
    PARAGRAPH,
];

fn is_fence(line: &str) -> bool {
    line.starts_with(FENCE)
}

fn parse_fence(blocks: &mut Blocks<'_>) -> Option<Block> {
    let opening = blocks.advance()?;
    let language = opening[FENCE.len()..].trim();

    let mut lines = Vec::new();
    while let Some(line) = blocks.advance() {
        if is_fence(line) {
            break;
        }
        lines.push(line.to_string());
    }

    Some(Block::FencedCode {
        language: (!language.is_empty()).then(|| language.to_string()),
        lines,
    })
}

fn parse_heading(blocks: &mut Blocks<'_>) -> Option<Block> {
    let line = blocks.advance()?;
    let caps = RE_HEADING.captures(line)?;
    Some(Block::Heading {
        level: caps[1].len() as u8,
        content: parse_inline(&caps[2]),
    })
}

fn parse_rule(blocks: &mut Blocks<'_>) -> Option<Block> {
    blocks.advance()?;
    Some(Block::HorizontalRule)
}

fn parse_list(blocks: &mut Blocks<'_>, marker: &Regex, ordered: bool) -> Block {
    let mut items = Vec::new();
    while let Some(line) = blocks.peek() {
        let Some(m) = marker.find(line) else { break };
        items.push(parse_inline(&line[m.end()..]));
        blocks.advance();
    }
    Block::List { ordered, items }
}

fn parse_quote(blocks: &mut Blocks<'_>) -> Option<Block> {
    let line = blocks.advance()?;
    Some(Block::Blockquote {
        content: parse_inline(&line[QUOTE.len()..]),
    })
}

/// Every blank line after the first block is a spacer, repeated blanks included.
fn parse_blank(blocks: &mut Blocks<'_>) -> Option<Block> {
    blocks.advance();
    blocks.emitted.then_some(Block::Spacer)
}

/// The first line always belongs to the paragraph; following lines join it
/// until one is claimed by another recognizer.
fn parse_paragraph(blocks: &mut Blocks<'_>) -> Option<Block> {
    let mut parts = vec![blocks.advance()?];
    while let Some(line) = blocks.peek() {
        if RECOGNIZERS.iter().any(|r| r.name != PARAGRAPH.name && (r.claims)(line)) {
            break;
        }
        parts.push(line);
        blocks.advance();
    }
    Some(Block::Paragraph {
        content: parse_inline(&parts.join(" ")),
    })
}
