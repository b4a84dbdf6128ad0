//! PPTX extraction: slide parts in presentation order, markup stripped.
//!
//! A presentation package lists its slides as `ppt/slides/slide<N>.xml`.
//! Archives do not store them in any particular order, and a string sort puts
//! `slide10` before `slide2`, so parts are ordered by the parsed `N`.
//!
//! Slide XML is flattened with a fixed sequence of text rules rather than an
//! XML parser; the rules are in [`strip_slide_markup`].

use crate::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{Cursor, Read};
use tracing::debug;
use zip::ZipArchive;

static RE_SLIDE_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^ppt/slides/slide(\d+)\.xml$").unwrap());
static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static RE_WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

/// Extract the text of a PPTX package held in memory.
pub async fn extract_pptx(bytes: Vec<u8>) -> Result<String, ExtractError> {
    tokio::task::spawn_blocking(move || extract_pptx_blocking(&bytes))
        .await
        .map_err(|e| ExtractError::Internal(format!("PPTX task panicked: {}", e)))?
}

fn extract_pptx_blocking(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|_| ExtractError::CorruptArchive)?;

    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    let slide_names = ordered_slide_parts(names);
    if slide_names.is_empty() {
        return Err(ExtractError::NoSlidesFound);
    }
    debug!("Found {} slide parts", slide_names.len());

    let mut all_text = String::new();
    for (idx, name) in slide_names.iter().enumerate() {
        let xml = read_part(&mut archive, name)?;
        let text = strip_slide_markup(&xml);
        if !text.is_empty() {
            all_text.push_str(&format!("[Slide {}]\n{}\n\n", idx + 1, text));
        } else {
            debug!("{} has no text", name);
        }
    }

    let final_text = all_text.trim();
    if final_text.is_empty() {
        return Err(ExtractError::NoReadableText);
    }
    Ok(final_text.to_string())
}

fn read_part(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<String, ExtractError> {
    let mut entry = archive
        .by_name(name)
        .map_err(|_| ExtractError::CorruptArchive)?;
    let mut buffer = Vec::new();
    entry
        .read_to_end(&mut buffer)
        .map_err(|_| ExtractError::CorruptArchive)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Keep only slide parts and sort them by slide number.
///
/// The sort is stable, so two parts with the same number keep archive order.
pub fn ordered_slide_parts<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut slides: Vec<(u64, String)> = names
        .into_iter()
        .filter_map(|name| {
            let number = RE_SLIDE_PART
                .captures(&name)?
                .get(1)?
                .as_str()
                .parse::<u64>()
                .unwrap_or(0);
            Some((number, name))
        })
        .collect();
    slides.sort_by_key(|(number, _)| *number);
    slides.into_iter().map(|(_, name)| name).collect()
}

/// Flatten one slide's XML to plain text.
///
/// Rules, in order:
/// 1. `<a:t>` and `</a:t>` become a space, `<a:br/>` becomes a newline
/// 2. every remaining tag is removed
/// 3. `&amp; &lt; &gt; &apos; &quot;` are decoded (in that order), `&#xD;` becomes a newline
/// 4. runs of two or more whitespace characters collapse to one space
/// 5. the result is trimmed
pub fn strip_slide_markup(xml: &str) -> String {
    let text = xml
        .replace("<a:t>", " ")
        .replace("</a:t>", " ")
        .replace("<a:br/>", "\n");
    let text = RE_TAG.replace_all(&text, "");
    let text = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&apos;", "'")
        .replace("&quot;", "\"")
        .replace("&#xD;", "\n");
    RE_WHITESPACE_RUN
        .replace_all(&text, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn slide(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><p:sld><p:cSld><p:spTree><p:sp><p:txBody>{body}</p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#
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
    fn slide_parts_sort_numerically() {
        let names = [
            "ppt/slides/slide2.xml",
            "ppt/slides/slide10.xml",
            "[Content_Types].xml",
            "ppt/slides/_rels/slide1.xml.rels",
            "ppt/slides/slide1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
        ]
        .map(String::from);
        assert_eq!(
            ordered_slide_parts(names),
            vec![
                "ppt/slides/slide1.xml",
                "ppt/slides/slide2.xml",
                "ppt/slides/slide10.xml"
            ]
        );
    }

    #[test]
    fn slide_part_match_is_case_insensitive() {
        let names = ["PPT/Slides/Slide3.XML".to_string()];
        assert_eq!(ordered_slide_parts(names).len(), 1);
    }

    #[test]
    fn markup_is_stripped_and_entities_decoded() {
        let xml = slide(
            "<a:p><a:r><a:rPr lang=\"en-US\"/><a:t>Q&amp;A</a:t></a:r></a:p>\
             <a:p><a:r><a:t>&lt;draft&gt; &quot;v2&quot; it&apos;s</a:t></a:r></a:p>",
        );
        assert_eq!(strip_slide_markup(&xml), "Q&A <draft> \"v2\" it's");
    }

    #[test]
    fn line_breaks_survive_single() {
        let xml = slide("<a:p><a:r><a:t>Line one</a:t></a:r><a:br/><a:r><a:t>Line two</a:t></a:r></a:p>");
        // The break sits between two padded runs, so " \n " collapses to a space.
        assert_eq!(strip_slide_markup(&xml), "Line one Line two");
    }

    #[test]
    fn lone_break_between_words_is_newline() {
        assert_eq!(strip_slide_markup("a<a:br/>b"), "a\nb");
        assert_eq!(strip_slide_markup("a&#xD;b"), "a\nb");
    }

    #[test]
    fn ampersand_is_decoded_first() {
        assert_eq!(strip_slide_markup("&amp;lt;"), "<");
    }

    #[tokio::test]
    async fn slides_are_extracted_in_numeric_order() {
        let bytes = package(&[
            ("ppt/slides/slide2.xml", &slide("<a:t>Second</a:t>")),
            ("ppt/slides/slide10.xml", &slide("<a:t>Tenth</a:t>")),
            ("ppt/slides/slide1.xml", &slide("<a:t>First</a:t>")),
        ]);
        let text = extract_pptx(bytes).await.unwrap();
        assert_eq!(
            text,
            "[Slide 1]\nFirst\n\n[Slide 2]\nSecond\n\n[Slide 3]\nTenth"
        );
    }

    #[tokio::test]
    async fn empty_slides_are_skipped_but_keep_position() {
        let bytes = package(&[
            ("ppt/slides/slide1.xml", &slide("<p:pic/>")),
            ("ppt/slides/slide2.xml", &slide("<a:t>Text</a:t>")),
        ]);
        assert_eq!(extract_pptx(bytes).await.unwrap(), "[Slide 2]\nText");
    }

    #[tokio::test]
    async fn image_only_deck_has_no_readable_text() {
        let bytes = package(&[("ppt/slides/slide1.xml", &slide("<p:pic/>"))]);
        assert!(matches!(
            extract_pptx(bytes).await.unwrap_err(),
            ExtractError::NoReadableText
        ));
    }

    #[tokio::test]
    async fn package_without_slides() {
        let bytes = package(&[("ppt/presentation.xml", "<p:presentation/>")]);
        assert!(matches!(
            extract_pptx(bytes).await.unwrap_err(),
            ExtractError::NoSlidesFound
        ));
    }

    #[tokio::test]
    async fn non_zip_is_corrupt_archive() {
        let err = extract_pptx(b"definitely not a zip".to_vec()).await.unwrap_err();
        assert!(matches!(err, ExtractError::CorruptArchive));
        assert!(err.to_string().contains(".pptx"));
    }
}
