//! PDF text extraction: per-page text runs framed with `[Page N]` markers.
//!
//! ## Why a backend trait?
//!
//! The page walk needs a native PDF engine (pdfium). Binding that engine is a
//! process-level, one-time step, so it happens when [`PdfiumBackend::bind`] is
//! called and never implicitly on first use. Everything after the engine
//! (joining runs, page framing, the empty-text check) lives in
//! [`assemble_pages`], which works on plain strings and is tested without a
//! pdfium library present.
//!
//! ## Why spawn_blocking?
//!
//! pdfium is a C++ library with internal global state. `pdfium-render`'s
//! `thread_safe` feature serialises every FFI call behind a mutex, and its
//! `sync` feature makes `Pdfium` `Send + Sync` so one bound library can be
//! shared by the blocking pool. Running the walk there keeps the Tokio
//! workers free while a large PDF is parsed.

use crate::config::DocumentFormat;
use crate::error::ExtractError;
use pdfium_render::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// A PDF engine able to list the text runs of every page.
///
/// Implementations are blocking; callers run them on the blocking pool.
pub trait PdfTextBackend: Send + Sync {
    /// Text runs of each page, in physical page order.
    fn page_fragments(&self, bytes: Vec<u8>) -> Result<Vec<Vec<String>>, ExtractError>;
}

/// Extract the text of a PDF held in memory.
pub async fn extract_pdf(
    backend: Arc<dyn PdfTextBackend>,
    bytes: Vec<u8>,
) -> Result<String, ExtractError> {
    let pages = tokio::task::spawn_blocking(move || backend.page_fragments(bytes))
        .await
        .map_err(|e| ExtractError::Internal(format!("PDF task panicked: {}", e)))??;

    info!("PDF has {} pages", pages.len());
    assemble_pages(&pages)
}

/// Join each page's runs with single spaces and frame the pages.
///
/// Output shape: `[Page 1]\n<text>\n\n[Page 2]\n<text>`, trimmed. Every page
/// is kept, including blank ones, so marker numbers match physical pages.
/// When no page carries any text the document is treated as image-only.
pub fn assemble_pages(pages: &[Vec<String>]) -> Result<String, ExtractError> {
    let mut full_text = String::new();
    let mut has_text = false;

    for (idx, fragments) in pages.iter().enumerate() {
        let page_text = fragments.join(" ");
        if !page_text.trim().is_empty() {
            has_text = true;
        }
        debug!("Page {}: {} runs, {} chars", idx + 1, fragments.len(), page_text.len());
        full_text.push_str(&format!("[Page {}]\n{}\n\n", idx + 1, page_text));
    }

    let trimmed = full_text.trim();
    if trimmed.is_empty() || !has_text {
        return Err(ExtractError::NoExtractableText {
            format: DocumentFormat::Pdf,
        });
    }
    Ok(trimmed.to_string())
}

// ── pdfium ───────────────────────────────────────────────────────────────

/// Production backend over a pdfium library bound once at construction.
pub struct PdfiumBackend {
    pdfium: Pdfium,
}

const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PdfiumBackend>();
};

impl PdfiumBackend {
    /// Bind pdfium.
    ///
    /// With an explicit `library_path` (a library file, or a directory holding
    /// the platform library) only that location is tried. Otherwise `./` is
    /// tried first, then the system library.
    pub fn bind(library_path: Option<&Path>) -> Result<Self, ExtractError> {
        let bindings = match library_path {
            Some(path) if path.is_dir() => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(path))
            }
            Some(path) => Pdfium::bind_to_library(path),
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| ExtractError::PdfiumBindingFailed(format!("{e}")))?;

        info!("pdfium bound");
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl PdfTextBackend for PdfiumBackend {
    fn page_fragments(&self, bytes: Vec<u8>) -> Result<Vec<Vec<String>>, ExtractError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_vec(bytes, None)
            .map_err(|e| {
                let err_str = format!("{:?}", e);
                if err_str.contains("Password") || err_str.contains("password") {
                    ExtractError::PasswordProtected
                } else {
                    ExtractError::CorruptDocument {
                        format: DocumentFormat::Pdf,
                        detail: err_str,
                    }
                }
            })?;

        let mut pages = Vec::new();
        for (idx, page) in document.pages().iter().enumerate() {
            let text = page.text().map_err(|e| ExtractError::CorruptDocument {
                format: DocumentFormat::Pdf,
                detail: format!("page {}: {:?}", idx + 1, e),
            })?;
            let fragments: Vec<String> = text.segments().iter().map(|s| s.text()).collect();
            pages.push(fragments);
        }
        Ok(pages)
    }
}

/// Stand-in used when pdfium could not be bound.
///
/// Every PDF request fails with [`ExtractError::PdfiumBindingFailed`]; other
/// formats are unaffected.
pub struct UnavailablePdfBackend {
    reason: String,
}

impl UnavailablePdfBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl PdfTextBackend for UnavailablePdfBackend {
    fn page_fragments(&self, _bytes: Vec<u8>) -> Result<Vec<Vec<String>>, ExtractError> {
        Err(ExtractError::PdfiumBindingFailed(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(texts: &[&[&str]]) -> Vec<Vec<String>> {
        texts
            .iter()
            .map(|p| p.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    struct FixedBackend(Vec<Vec<String>>);

    impl PdfTextBackend for FixedBackend {
        fn page_fragments(&self, _bytes: Vec<u8>) -> Result<Vec<Vec<String>>, ExtractError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn pages_are_framed_in_order() {
        let text = assemble_pages(&pages(&[&["Hello"], &["World"]])).unwrap();
        assert_eq!(text, "[Page 1]\nHello\n\n[Page 2]\nWorld");
        assert!(text.find("[Page 1]").unwrap() < text.find("[Page 2]").unwrap());
    }

    #[test]
    fn runs_are_joined_with_single_spaces() {
        let text = assemble_pages(&pages(&[&["Quarterly", "report", "2024"]])).unwrap();
        assert_eq!(text, "[Page 1]\nQuarterly report 2024");
    }

    #[test]
    fn blank_pages_keep_their_marker() {
        let text = assemble_pages(&pages(&[&["Intro"], &[], &["Outro"]])).unwrap();
        assert!(text.contains("[Page 2]\n\n\n[Page 3]\nOutro"), "got: {text:?}");
    }

    #[test]
    fn image_only_pdf_has_no_text() {
        let err = assemble_pages(&pages(&[&[], &["  "]])).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::NoExtractableText {
                format: DocumentFormat::Pdf
            }
        ));
        assert!(err.to_string().contains("OCR"));
    }

    #[test]
    fn zero_page_pdf_has_no_text() {
        assert!(assemble_pages(&[]).is_err());
    }

    #[test]
    fn backends_can_be_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PdfiumBackend>();
        assert_send_sync::<UnavailablePdfBackend>();
        assert_send_sync::<Arc<dyn PdfTextBackend>>();
    }

    #[tokio::test]
    async fn extract_runs_backend_on_blocking_pool() {
        let backend: Arc<dyn PdfTextBackend> =
            Arc::new(FixedBackend(pages(&[&["alpha"], &["beta"]])));
        let text = extract_pdf(backend, b"%PDF-1.7".to_vec()).await.unwrap();
        assert_eq!(text, "[Page 1]\nalpha\n\n[Page 2]\nbeta");
    }

    #[tokio::test]
    async fn unavailable_backend_reports_binding_failure() {
        let backend: Arc<dyn PdfTextBackend> = Arc::new(UnavailablePdfBackend::new("not found"));
        let err = extract_pdf(backend, Vec::new()).await.unwrap_err();
        assert!(matches!(err, ExtractError::PdfiumBindingFailed(ref r) if r == "not found"));
    }
}
