//! Eager extraction entry points.
//!
//! ## Why an `Extractor` value?
//!
//! PDF support needs a pdfium library bound to the process. Binding is done
//! once, when the [`Extractor`] is built, and the bound engine is shared by
//! every file extracted through it. The other formats need no setup, so
//! [`Extractor::without_pdf`] gives a fully working extractor for DOCX, PPTX
//! and TXT on machines without pdfium.
//!
//! Use [`crate::stream::prepare_stream`] instead of
//! [`Extractor::prepare_batch`] to receive documents as each one finishes.

use crate::config::{DocumentFormat, ExtractorConfig};
use crate::error::ExtractError;
use crate::output::{count_sections, BatchItem, DocumentStats, PreparedDocument};
use crate::pipeline::legacy::with_legacy_fallback;
use crate::pipeline::pdf::{PdfTextBackend, PdfiumBackend, UnavailablePdfBackend};
use crate::pipeline::source::DocumentSource;
use crate::pipeline::truncate::truncate;
use crate::pipeline::{docx, pdf, pptx, sniff};
use crate::progress::Stage;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Extracts text from documents under one configuration.
///
/// Cheap to share by reference across tasks; it holds no per-file state.
pub struct Extractor {
    config: ExtractorConfig,
    pdf: Arc<dyn PdfTextBackend>,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Extractor {
    /// Build an extractor, binding pdfium now.
    ///
    /// # Errors
    /// [`ExtractError::PdfiumBindingFailed`] when no pdfium library could be
    /// bound. Callers that can live without PDFs may fall back to
    /// [`Extractor::without_pdf`].
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractError> {
        let backend = PdfiumBackend::bind(config.pdfium_library_path.as_deref())?;
        Ok(Self::with_pdf_backend(config, Arc::new(backend)))
    }

    /// An extractor whose PDF requests fail with
    /// [`ExtractError::PdfiumBindingFailed`]; every other format works.
    pub fn without_pdf(config: ExtractorConfig) -> Self {
        Self::with_pdf_backend(
            config,
            Arc::new(UnavailablePdfBackend::new("PDF support was not enabled")),
        )
    }

    /// An extractor over a caller-supplied PDF engine.
    pub fn with_pdf_backend(config: ExtractorConfig, backend: Arc<dyn PdfTextBackend>) -> Self {
        Self {
            config,
            pdf: backend,
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract the plain text of one document.
    ///
    /// # Returns
    /// Non-empty text. PDFs carry `[Page N]` markers, presentations carry
    /// `[Slide N]` markers, plain text is returned as decoded.
    ///
    /// # Errors
    /// [`ExtractError::FileTooLarge`] and [`ExtractError::UnsupportedFormat`]
    /// are raised from the name and size alone; the contents are never read.
    /// Failures of `.doc` / `.ppt` files are always
    /// [`ExtractError::LegacyFormatUnsupported`].
    pub async fn extract<S: DocumentSource>(&self, source: &S) -> Result<String, ExtractError> {
        let result = self.run(source).await.map(|(_, text)| text);
        self.report(source.name(), &result, |text| text.chars().count());
        result
    }

    /// Extract and cap to the AI budget.
    pub async fn prepare<S: DocumentSource>(
        &self,
        source: &S,
    ) -> Result<PreparedDocument, ExtractError> {
        let start = Instant::now();
        let result = self.run(source).await.map(|(format, text)| {
            self.stage(source.name(), Stage::Truncating);
            let max_chars = self.config.limits.max_chars_for_ai;
            let ai_text = truncate(&text, max_chars);
            let char_count = text.chars().count();
            PreparedDocument {
                name: source.name().to_string(),
                format,
                truncated: char_count > max_chars,
                stats: DocumentStats {
                    size_bytes: source.size(),
                    char_count,
                    ai_char_count: ai_text.chars().count(),
                    sections: count_sections(&text),
                    duration_ms: start.elapsed().as_millis() as u64,
                },
                ai_text,
                text,
            }
        });
        self.report(source.name(), &result, |doc| doc.stats.char_count);
        result
    }

    /// Prepare many documents with at most `concurrency` in flight.
    ///
    /// Items come back in input order. A failing file only affects its own
    /// item.
    pub async fn prepare_batch<S, I>(&self, sources: I) -> Vec<BatchItem>
    where
        S: DocumentSource,
        I: IntoIterator<Item = S>,
    {
        let sources: Vec<S> = sources.into_iter().collect();
        let total = sources.len();
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_batch_start(total);
        }

        let items: Vec<BatchItem> = stream::iter(sources.into_iter().enumerate().map(
            move |(index, source)| async move {
                let name = source.name().to_string();
                let result = self.prepare(&source).await;
                BatchItem {
                    index,
                    name,
                    result,
                }
            },
        ))
        .buffered(self.config.concurrency)
        .collect()
        .await;

        let success = items.iter().filter(|i| i.is_ok()).count();
        info!("Batch complete: {}/{} documents", success, total);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_batch_complete(total, success);
        }
        items
    }

    /// Prepare a document and write its full text to `output_path`.
    ///
    /// Uses atomic write (temp file + rename) so readers never see a partial file.
    pub async fn extract_to_file<S: DocumentSource>(
        &self,
        source: &S,
        output_path: impl AsRef<Path>,
    ) -> Result<PreparedDocument, ExtractError> {
        let document = self.prepare(source).await?;
        write_text_atomic(output_path.as_ref(), &document.text).await?;
        Ok(document)
    }

    /// Synchronous wrapper around [`Extractor::extract`].
    ///
    /// Creates a temporary tokio runtime internally; do not call from inside
    /// an async context.
    pub fn extract_sync<S: DocumentSource>(&self, source: &S) -> Result<String, ExtractError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| ExtractError::Internal(format!("Failed to create tokio runtime: {}", e)))?
            .block_on(self.extract(source))
    }

    // ── Internal helpers ─────────────────────────────────────────────────

    async fn run<S: DocumentSource>(
        &self,
        source: &S,
    ) -> Result<(DocumentFormat, String), ExtractError> {
        let name = source.name();
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_file_start(name);
        }

        let format = sniff::sniff(name, source.size(), &self.config.limits)?;
        info!("Extracting {} as {} ({} bytes)", name, format.label(), source.size());

        let text = if format.is_legacy() {
            with_legacy_fallback(format, self.dispatch(format, source)).await?
        } else {
            self.dispatch(format, source).await?
        };

        info!("Extracted {} chars from {}", text.chars().count(), name);
        Ok((format, text))
    }

    /// Legacy formats go through the reader of their modern equivalent.
    async fn dispatch<S: DocumentSource>(
        &self,
        format: DocumentFormat,
        source: &S,
    ) -> Result<String, ExtractError> {
        match format {
            DocumentFormat::Pdf => pdf::extract_pdf(Arc::clone(&self.pdf), self.read(source).await?).await,
            DocumentFormat::Docx | DocumentFormat::Doc => {
                docx::extract_docx(self.read(source).await?).await
            }
            DocumentFormat::Pptx | DocumentFormat::Ppt => {
                pptx::extract_pptx(self.read(source).await?).await
            }
            DocumentFormat::Txt => self.read_txt(source).await,
        }
    }

    async fn read<S: DocumentSource>(&self, source: &S) -> Result<Vec<u8>, ExtractError> {
        self.stage(source.name(), Stage::Reading);
        let bytes = source
            .read_bytes()
            .await
            .map_err(|e| ExtractError::ReadFailed {
                name: source.name().to_string(),
                source: e,
            })?;
        debug!("Read {} bytes from {}", bytes.len(), source.name());
        self.stage(source.name(), Stage::Extracting);
        Ok(bytes)
    }

    async fn read_txt<S: DocumentSource>(&self, source: &S) -> Result<String, ExtractError> {
        self.stage(source.name(), Stage::Reading);
        let text = source
            .read_text()
            .await
            .map_err(|e| ExtractError::ReadFailed {
                name: source.name().to_string(),
                source: e,
            })?;
        self.stage(source.name(), Stage::Extracting);
        if text.trim().is_empty() {
            return Err(ExtractError::NoExtractableText {
                format: DocumentFormat::Txt,
            });
        }
        Ok(text)
    }

    fn stage(&self, name: &str, stage: Stage) {
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_stage(name, stage);
        }
    }

    fn report<T>(&self, name: &str, result: &Result<T, ExtractError>, chars: impl Fn(&T) -> usize) {
        if let Some(ref cb) = self.config.progress_callback {
            match result {
                Ok(value) => cb.on_file_complete(name, chars(value)),
                Err(e) => cb.on_file_error(name, &e.to_string()),
            }
        }
    }
}

/// Write `contents` to `path` through a sibling temp file and a rename.
///
/// Parent directories are created as needed.
pub async fn write_text_atomic(path: &Path, contents: &str) -> Result<(), ExtractError> {
    let write_err = |e| ExtractError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));

    if let Err(e) = tokio::fs::write(&tmp_path, contents).await {
        discard_temp(&tmp_path).await;
        return Err(write_err(e));
    }
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        discard_temp(&tmp_path).await;
        return Err(write_err(e));
    }
    Ok(())
}

async fn discard_temp(tmp_path: &Path) {
    if let Err(e) = tokio::fs::remove_file(tmp_path).await {
        debug!("Could not remove {}: {}", tmp_path.display(), e);
    }
}
