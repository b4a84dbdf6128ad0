//! Error types for the edgequake-doc2text library.
//!
//! Every failure is terminal for the file it concerns: nothing is retried
//! inside the library. The caller may re-run extraction from scratch.
//!
//! Messages are written for the person who uploaded the file, so most of them
//! end with something actionable (compress the file, re-save as `.pptx`, run
//! OCR first).
//!
//! Modern formats propagate the originating error unchanged. Legacy formats
//! (`.doc`, `.ppt`) replace any failure with [`ExtractError::LegacyFormatUnsupported`];
//! see [`crate::pipeline::legacy`].

use crate::config::DocumentFormat;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-doc2text library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Sniffer errors ────────────────────────────────────────────────────
    /// File exceeds `FileLimits::max_size_bytes`. Raised before any byte is read.
    #[error(
        "File is too large ({size_mb:.1} MB). Maximum allowed size is {limit_mb} MB. \
Please compress or split the file."
    )]
    FileTooLarge { size_mb: f64, limit_mb: u64 },

    /// Extension is not in the dispatch table.
    #[error("Unsupported file type \".{extension}\". Supported formats: {supported}.")]
    UnsupportedFormat { extension: String, supported: String },

    // ── Content errors ────────────────────────────────────────────────────
    /// The document parsed but produced no text.
    #[error("{}", .format.no_text_hint())]
    NoExtractableText { format: DocumentFormat },

    /// The zip package opened but contains no `ppt/slides/slide<N>.xml` part.
    #[error(
        "No slides found in this PowerPoint file. It may be an unsupported format or an empty presentation."
    )]
    NoSlidesFound,

    /// Slides exist but every one of them stripped down to nothing.
    #[error(
        "No readable text found in this presentation. Slides may contain only images or shapes without text."
    )]
    NoReadableText,

    /// The presentation package could not be opened as a zip archive.
    #[error(
        "Could not open this PowerPoint file. It may be corrupted or in the older .ppt binary format. \
Please save it as .pptx and try again."
    )]
    CorruptArchive,

    /// A `.doc` / `.ppt` upload could not be read through the modern-format path.
    #[error("{}", .format.legacy_hint())]
    LegacyFormatUnsupported { format: DocumentFormat },

    /// The container opened (or should have) but its structure is unreadable.
    #[error("This {} file could not be read: {detail}\nIt may be corrupted. Try re-saving it and upload again.", .format.label())]
    CorruptDocument {
        format: DocumentFormat,
        detail: String,
    },

    /// PDF is encrypted; the library has no password input.
    #[error("This PDF is password-protected. Remove the password and upload it again.")]
    PasswordProtected,

    // ── Source errors ─────────────────────────────────────────────────────
    /// Local file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Reading the source bytes failed part-way.
    #[error("Failed to read '{name}': {source}")]
    ReadFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the output text file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// The pdfium library could not be bound when the extractor was built.
    #[error(
        "PDF support is unavailable: failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (or pass --pdfium-lib).\n\
  • Place libpdfium next to the executable.\n\
  • Install pdfium system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// True for the errors raised by the sniffer, before any content is read.
    pub fn is_rejected_upfront(&self) -> bool {
        matches!(
            self,
            ExtractError::FileTooLarge { .. } | ExtractError::UnsupportedFormat { .. }
        )
    }
}

impl DocumentFormat {
    fn no_text_hint(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => {
                "No text could be extracted from this PDF. It may be a scanned image-only PDF. \
Try running OCR on it first."
            }
            DocumentFormat::Docx | DocumentFormat::Doc => {
                "No text found in this Word document. It may be empty or image-only."
            }
            DocumentFormat::Pptx | DocumentFormat::Ppt => {
                "No readable text found in this presentation. Slides may contain only images or shapes without text."
            }
            DocumentFormat::Txt => "This text file is empty.",
        }
    }

    fn legacy_hint(&self) -> &'static str {
        match self {
            DocumentFormat::Ppt | DocumentFormat::Pptx => {
                "Legacy .ppt binary format cannot be extracted. Open the file in PowerPoint and save as .pptx, \
then re-upload."
            }
            _ => {
                "Legacy .doc format has limited support. Please open the file in Word and save it as .docx, \
then re-upload."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_too_large_display() {
        let e = ExtractError::FileTooLarge {
            size_mb: 25.04,
            limit_mb: 20,
        };
        let msg = e.to_string();
        assert!(msg.contains("25.0 MB"), "got: {msg}");
        assert!(msg.contains("20 MB"), "got: {msg}");
        assert!(msg.contains("compress or split"));
    }

    #[test]
    fn unsupported_format_names_extension_and_set() {
        let e = ExtractError::UnsupportedFormat {
            extension: "xlsx".into(),
            supported: "pdf, docx, pptx, txt".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("\".xlsx\""), "got: {msg}");
        assert!(msg.contains("pdf, docx, pptx, txt"));
    }

    #[test]
    fn no_text_mentions_ocr_for_pdf() {
        let e = ExtractError::NoExtractableText {
            format: DocumentFormat::Pdf,
        };
        let msg = e.to_string();
        assert!(msg.contains("scanned"));
        assert!(msg.contains("OCR"));
    }

    #[test]
    fn legacy_messages_name_modern_extension() {
        let doc = ExtractError::LegacyFormatUnsupported {
            format: DocumentFormat::Doc,
        };
        let ppt = ExtractError::LegacyFormatUnsupported {
            format: DocumentFormat::Ppt,
        };
        assert!(doc.to_string().contains(".docx"));
        assert!(ppt.to_string().contains(".pptx"));
    }

    #[test]
    fn corrupt_document_names_format() {
        let e = ExtractError::CorruptDocument {
            format: DocumentFormat::Docx,
            detail: "missing word/document.xml".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("DOCX"), "got: {msg}");
        assert!(msg.contains("missing word/document.xml"));
    }

    #[test]
    fn upfront_rejections() {
        assert!(ExtractError::FileTooLarge {
            size_mb: 30.0,
            limit_mb: 20
        }
        .is_rejected_upfront());
        assert!(!ExtractError::CorruptArchive.is_rejected_upfront());
    }
}
