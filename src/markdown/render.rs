//! Display surfaces for parsed blocks: HTML and terminal plain text.

use super::block::Block;
use super::inline::Inline;

/// Render `content` as an HTML fragment, one element per line.
///
/// Heading level `n` becomes `<h{n+1}>`: the page title owns `<h1>`.
pub fn to_html(content: &str) -> String {
    super::render(content)
        .map(|block| block_html(&block))
        .collect::<Vec<_>>()
        .join("\n")
}

fn block_html(block: &Block) -> String {
    match block {
        Block::Heading { level, content } => {
            let tag = level + 1;
            format!("<h{tag}>{}</h{tag}>", spans_html(content))
        }
        Block::FencedCode { language, lines } => {
            let code = escape(&lines.join("\n"));
            match language {
                Some(lang) => format!(
                    "<pre><code class=\"language-{}\">{code}</code></pre>",
                    escape(lang)
                ),
                None => format!("<pre><code>{code}</code></pre>"),
            }
        }
        Block::List { ordered, items } => {
            let tag = if *ordered { "ol" } else { "ul" };
            let items: String = items
                .iter()
                .map(|item| format!("<li>{}</li>", spans_html(item)))
                .collect();
            format!("<{tag}>{items}</{tag}>")
        }
        Block::HorizontalRule => "<hr>".to_string(),
        Block::Blockquote { content } => format!("<blockquote>{}</blockquote>", spans_html(content)),
        Block::Paragraph { content } => format!("<p>{}</p>", spans_html(content)),
        Block::Spacer => "<div class=\"spacer\"></div>".to_string(),
    }
}

fn spans_html(spans: &[Inline]) -> String {
    spans
        .iter()
        .map(|span| match span {
            Inline::Text(s) => escape(s),
            Inline::Bold(s) => format!("<strong>{}</strong>", escape(s)),
            Inline::Italic(s) => format!("<em>{}</em>", escape(s)),
            Inline::Code(s) => format!("<code>{}</code>", escape(s)),
            Inline::Strikethrough(s) => format!("<s>{}</s>", escape(s)),
        })
        .collect()
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render `content` for a terminal with the inline markers removed.
///
/// Bullets become `•`, numbered items are renumbered from 1, code lines are
/// indented by four spaces and a spacer is an empty line.
pub fn to_plain_text(content: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    for block in super::render(content) {
        match block {
            Block::Heading { content, .. } => out.push(spans_text(&content)),
            Block::FencedCode { lines, .. } => {
                out.extend(lines.iter().map(|line| format!("    {line}")))
            }
            Block::List { ordered, items } => {
                for (i, item) in items.iter().enumerate() {
                    let marker = if ordered {
                        format!("{}.", i + 1)
                    } else {
                        "•".to_string()
                    };
                    out.push(format!("{marker} {}", spans_text(item)));
                }
            }
            Block::HorizontalRule => out.push("─".repeat(40)),
            Block::Blockquote { content } => out.push(format!("│ {}", spans_text(&content))),
            Block::Paragraph { content } => out.push(spans_text(&content)),
            Block::Spacer => out.push(String::new()),
        }
    }
    out.join("\n")
}

fn spans_text(spans: &[Inline]) -> String {
    spans.iter().map(Inline::text).collect()
}
