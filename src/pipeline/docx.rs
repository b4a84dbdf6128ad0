//! DOCX extraction: the raw-text layer of `word/document.xml`.
//!
//! Formatting is dropped; only run text survives. Paragraphs (body, table
//! cells, text boxes) each end with a blank line, tabs and explicit breaks
//! are kept as `\t` and `\n`. The result is trimmed.

use crate::config::DocumentFormat;
use crate::error::ExtractError;
use quick_xml::events::Event;
use quick_xml::Reader as XmlReader;
use std::io::{Cursor, Read};
use tracing::debug;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract the text of a DOCX package held in memory.
pub async fn extract_docx(bytes: Vec<u8>) -> Result<String, ExtractError> {
    tokio::task::spawn_blocking(move || extract_docx_blocking(&bytes))
        .await
        .map_err(|e| ExtractError::Internal(format!("DOCX task panicked: {}", e)))?
}

fn extract_docx_blocking(bytes: &[u8]) -> Result<String, ExtractError> {
    let xml = read_document_part(bytes)?;
    let text = raw_text(&xml).map_err(|e| corrupt(format!("malformed {DOCUMENT_PART}: {e}")))?;

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::NoExtractableText {
            format: DocumentFormat::Docx,
        });
    }
    debug!("DOCX raw text: {} chars", trimmed.len());
    Ok(trimmed.to_string())
}

fn read_document_part(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| corrupt(format!("not a zip package ({e})")))?;
    let mut entry = archive
        .by_name(DOCUMENT_PART)
        .map_err(|_| corrupt(format!("missing {DOCUMENT_PART}")))?;
    let mut buffer = Vec::new();
    entry
        .read_to_end(&mut buffer)
        .map_err(|e| corrupt(format!("could not inflate {DOCUMENT_PART}: {e}")))?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn corrupt(detail: String) -> ExtractError {
    ExtractError::CorruptDocument {
        format: DocumentFormat::Docx,
        detail,
    }
}

/// Walk WordprocessingML and return its raw text, untrimmed.
///
/// `mc:Fallback` branches are skipped: they duplicate the content of the
/// preferred `mc:Choice` branch.
pub fn raw_text(xml: &str) -> Result<String, quick_xml::Error> {
    let mut reader = XmlReader::from_str(xml);
    let mut buf = Vec::new();

    let mut out = String::new();
    // Paragraphs nest through text boxes; the innermost one collects text.
    let mut paragraphs: Vec<String> = Vec::new();
    let mut in_run = false;
    let mut in_text = false;
    let mut fallback_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let name = e.local_name();
                if fallback_depth > 0 {
                    if name.as_ref() == b"Fallback" {
                        fallback_depth += 1;
                    }
                } else {
                    match name.as_ref() {
                        b"Fallback" => fallback_depth = 1,
                        b"p" => paragraphs.push(String::new()),
                        b"r" => in_run = true,
                        b"t" => in_text = true,
                        b"tab" | b"br" | b"cr" | b"noBreakHyphen" if in_run => {
                            push_special(&mut paragraphs, &mut out, name.as_ref())
                        }
                        _ => {}
                    }
                }
            }
            Event::Empty(ref e) => {
                let name = e.local_name();
                if fallback_depth == 0 && in_run {
                    push_special(&mut paragraphs, &mut out, name.as_ref());
                }
            }
            Event::Text(e) => {
                if fallback_depth == 0 && in_text {
                    let text = e.unescape()?;
                    push_text(&mut paragraphs, &mut out, &text);
                }
            }
            Event::CData(e) => {
                if fallback_depth == 0 && in_text {
                    let text = String::from_utf8_lossy(&e);
                    push_text(&mut paragraphs, &mut out, &text);
                }
            }
            Event::End(ref e) => {
                let name = e.local_name();
                if fallback_depth > 0 {
                    if name.as_ref() == b"Fallback" {
                        fallback_depth -= 1;
                    }
                } else {
                    match name.as_ref() {
                        b"t" => in_text = false,
                        b"r" => in_run = false,
                        b"p" => {
                            if let Some(paragraph) = paragraphs.pop() {
                                let target = paragraphs.last_mut().unwrap_or(&mut out);
                                target.push_str(&paragraph);
                                target.push_str("\n\n");
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    // Unclosed paragraphs in a truncated part still contribute their text.
    for paragraph in paragraphs.drain(..) {
        out.push_str(&paragraph);
    }
    Ok(out)
}

fn push_text(paragraphs: &mut [String], out: &mut String, text: &str) {
    match paragraphs.last_mut() {
        Some(p) => p.push_str(text),
        None => out.push_str(text),
    }
}

fn push_special(paragraphs: &mut [String], out: &mut String, local: &[u8]) {
    let text = match local {
        b"tab" => "\t",
        b"br" | b"cr" => "\n",
        b"noBreakHyphen" => "-",
        _ => return,
    };
    push_text(paragraphs, out, text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn document(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        )
    }

    fn package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn paragraphs_are_separated_by_blank_lines() {
        let xml = document(
            "<w:p><w:r><w:t>First</w:t></w:r></w:p><w:p><w:r><w:t>Second</w:t></w:r></w:p>",
        );
        assert_eq!(raw_text(&xml).unwrap(), "First\n\nSecond\n\n");
    }

    #[test]
    fn runs_concatenate_and_keep_spaces() {
        let xml = document(
            r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Hello </w:t></w:r><w:r><w:t>world</w:t></w:r></w:p>"#,
        );
        assert_eq!(raw_text(&xml).unwrap(), "Hello world\n\n");
    }

    #[test]
    fn tabs_and_breaks_inside_runs() {
        let xml = document(
            "<w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/></w:tabs></w:pPr>\
             <w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>",
        );
        assert_eq!(raw_text(&xml).unwrap(), "a\tb\nc\n\n");
    }

    #[test]
    fn entities_are_decoded() {
        let xml = document("<w:p><w:r><w:t>R&amp;D &lt;2024&gt;</w:t></w:r></w:p>");
        assert_eq!(raw_text(&xml).unwrap(), "R&D <2024>\n\n");
    }

    #[test]
    fn fallback_content_is_skipped() {
        let xml = document(
            "<w:p><w:r><mc:AlternateContent xmlns:mc=\"m\"><mc:Choice><w:txbxContent><w:p><w:r><w:t>Box</w:t></w:r></w:p></w:txbxContent></mc:Choice>\
             <mc:Fallback><w:txbxContent><w:p><w:r><w:t>Box</w:t></w:r></w:p></w:txbxContent></mc:Fallback></mc:AlternateContent></w:r></w:p>",
        );
        assert_eq!(raw_text(&xml).unwrap().matches("Box").count(), 1);
    }

    #[test]
    fn table_cells_are_paragraphs() {
        let xml = document(
            "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>A1</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>B1</w:t></w:r></w:p></w:tc></w:tr></w:tbl>",
        );
        assert_eq!(raw_text(&xml).unwrap(), "A1\n\nB1\n\n");
    }

    #[tokio::test]
    async fn extract_trims_output() {
        let bytes = package(&[(
            DOCUMENT_PART,
            &document("<w:p><w:r><w:t>Only line</w:t></w:r></w:p>"),
        )]);
        assert_eq!(extract_docx(bytes).await.unwrap(), "Only line");
    }

    #[tokio::test]
    async fn empty_document_has_no_text() {
        let bytes = package(&[(DOCUMENT_PART, &document("<w:p/><w:p><w:r/></w:p>"))]);
        let err = extract_docx(bytes).await.unwrap_err();
        assert!(matches!(
            err,
            ExtractError::NoExtractableText {
                format: DocumentFormat::Docx
            }
        ));
    }

    #[tokio::test]
    async fn non_zip_is_corrupt() {
        let err = extract_docx(b"\xD0\xCF\x11\xE0 legacy".to_vec()).await.unwrap_err();
        assert!(matches!(err, ExtractError::CorruptDocument { .. }));
    }

    #[tokio::test]
    async fn missing_document_part_is_corrupt() {
        let bytes = package(&[("word/styles.xml", "<w:styles/>")]);
        let err = extract_docx(bytes).await.unwrap_err();
        assert!(err.to_string().contains("word/document.xml"), "got: {err}");
    }
}
