//! Legacy binary formats (`.doc`, `.ppt`).
//!
//! There is no parser for the pre-2007 binary formats. A legacy upload is
//! handed to the OOXML extractor of its modern equivalent, which succeeds when
//! the file is really a renamed `.docx` / `.pptx`. Any failure on that path,
//! whatever its cause, is replaced with [`ExtractError::LegacyFormatUnsupported`]
//! telling the user to re-save the file in the modern format.

use crate::config::DocumentFormat;
use crate::error::ExtractError;
use std::future::Future;
use tracing::{debug, warn};

/// Run `attempt` and rewrite any failure for a legacy `format`.
///
/// The original cause is logged at debug level and then discarded.
pub async fn with_legacy_fallback<F>(format: DocumentFormat, attempt: F) -> Result<String, ExtractError>
where
    F: Future<Output = Result<String, ExtractError>>,
{
    attempt.await.or_else(|cause| {
        debug!("{} read as {} failed: {}", format, format.modern_equivalent(), cause);
        warn!("Legacy .{} file could not be read", format);
        Err(ExtractError::LegacyFormatUnsupported { format })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn success_passes_through() {
        let text = with_legacy_fallback(DocumentFormat::Doc, async { Ok("renamed docx".to_string()) })
            .await
            .unwrap();
        assert_eq!(text, "renamed docx");
    }

    #[tokio::test]
    async fn any_failure_becomes_legacy_error() {
        let causes = [
            ExtractError::CorruptArchive,
            ExtractError::NoSlidesFound,
            ExtractError::NoExtractableText {
                format: DocumentFormat::Docx,
            },
        ];
        for cause in causes {
            let err = with_legacy_fallback(DocumentFormat::Ppt, async move { Err(cause) })
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ExtractError::LegacyFormatUnsupported {
                    format: DocumentFormat::Ppt
                }
            ));
        }
    }

    #[tokio::test]
    async fn doc_failure_suggests_docx() {
        let err = with_legacy_fallback(DocumentFormat::Doc, async {
            Err(ExtractError::CorruptDocument {
                format: DocumentFormat::Docx,
                detail: "not a zip package".into(),
            })
        })
        .await
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("save it as .docx"), "got: {msg}");
        assert!(!msg.contains("not a zip package"));
    }
}
