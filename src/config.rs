//! Configuration types for document text extraction.
//!
//! Two layers:
//!
//! * [`FileLimits`]: the read-only upload limits (size cap, AI character
//!   budget, advertised formats, user-facing notes). The process-wide instance
//!   is [`FILE_LIMITS`]; it is built once and never mutated.
//! * [`ExtractorConfig`]: everything an [`crate::Extractor`] needs at
//!   construction time, built via its [`ExtractorConfigBuilder`].
//!
//! All knobs live in these two structs so a config can be shared across tasks
//! and logged as a whole.

use crate::error::ExtractError;
use crate::progress::ProgressCallback;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// The process-wide upload limits.
///
/// Upload surfaces render `notes` and `supported_types` from here; the sniffer
/// enforces `max_size_bytes`; the truncator defaults to `max_chars_for_ai`.
pub static FILE_LIMITS: Lazy<FileLimits> = Lazy::new(FileLimits::default);

/// Upload limits shared by the sniffer, the truncator and the upload UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLimits {
    /// Maximum upload size in megabytes. Default: 20.
    pub max_size_mb: u64,
    /// `max_size_mb` in bytes (MiB based).
    pub max_size_bytes: u64,
    /// Characters of extracted text forwarded to the model. Default: 12 000.
    pub max_chars_for_ai: usize,
    /// Extensions advertised to users, in display order.
    ///
    /// `.doc` and `.ppt` are accepted through the legacy fallback but are
    /// deliberately not advertised.
    pub supported_types: Vec<String>,
    /// User-facing notes, in display order.
    pub notes: Vec<String>,
}

impl Default for FileLimits {
    fn default() -> Self {
        Self::compose(20, 20 * BYTES_PER_MB, 12_000)
    }
}

impl FileLimits {
    /// Limits with a custom size cap and AI budget.
    ///
    /// The notes are rebuilt from both values, so what users are told always
    /// matches what the sniffer and the truncator enforce.
    pub fn new(max_size_mb: u64, max_chars_for_ai: usize) -> Result<Self, ExtractError> {
        if max_size_mb == 0 {
            return Err(ExtractError::InvalidConfig(
                "Maximum file size must be ≥ 1 MB".into(),
            ));
        }
        if max_chars_for_ai == 0 {
            return Err(ExtractError::InvalidConfig(
                "AI character budget must be ≥ 1".into(),
            ));
        }
        let max_size_bytes = max_size_mb.checked_mul(BYTES_PER_MB).ok_or_else(|| {
            ExtractError::InvalidConfig(format!(
                "Maximum file size of {max_size_mb} MB does not fit in a byte count"
            ))
        })?;
        Ok(Self::compose(max_size_mb, max_size_bytes, max_chars_for_ai))
    }

    /// Limits with a custom size cap and the default AI budget.
    pub fn with_max_size_mb(max_size_mb: u64) -> Result<Self, ExtractError> {
        Self::new(max_size_mb, FileLimits::default().max_chars_for_ai)
    }

    fn compose(max_size_mb: u64, max_size_bytes: u64, max_chars_for_ai: usize) -> Self {
        Self {
            max_size_mb,
            max_size_bytes,
            max_chars_for_ai,
            supported_types: ["pdf", "docx", "pptx", "txt"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            notes: vec![
                format!("Maximum file size: {max_size_mb} MB"),
                "Supported formats: PDF, DOCX, PPTX, TXT".to_string(),
                format!(
                    "Text is capped at ~{} characters sent to AI",
                    crate::pipeline::truncate::group_thousands(max_chars_for_ai)
                ),
                "Scanned PDFs (image-only) cannot be extracted".to_string(),
                ".doc and .ppt (legacy binary) have limited support — convert to .docx/.pptx for best results"
                    .to_string(),
            ],
        }
    }

    /// The advertised set as shown in error messages: `pdf, docx, pptx, txt`.
    pub fn supported_list(&self) -> String {
        self.supported_types.join(", ")
    }
}

// ── Formats ──────────────────────────────────────────────────────────────

/// Every extension the dispatcher has a handler for.
///
/// Anything else is rejected with [`ExtractError::UnsupportedFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    /// Legacy Word; tried through the DOCX path.
    Doc,
    Pptx,
    /// Legacy PowerPoint; tried through the PPTX path.
    Ppt,
    Txt,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 6] = [
        DocumentFormat::Pdf,
        DocumentFormat::Docx,
        DocumentFormat::Doc,
        DocumentFormat::Pptx,
        DocumentFormat::Ppt,
        DocumentFormat::Txt,
    ];

    /// Case-insensitive lookup of a bare extension (no leading dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Doc => "doc",
            DocumentFormat::Pptx => "pptx",
            DocumentFormat::Ppt => "ppt",
            DocumentFormat::Txt => "txt",
        }
    }

    /// Display label, e.g. `PDF`.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
            DocumentFormat::Doc => "DOC",
            DocumentFormat::Pptx => "PPTX",
            DocumentFormat::Ppt => "PPT",
            DocumentFormat::Txt => "TXT",
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, DocumentFormat::Doc | DocumentFormat::Ppt)
    }

    /// The OOXML format a legacy extension is retried as.
    pub fn modern_equivalent(&self) -> DocumentFormat {
        match self {
            DocumentFormat::Doc => DocumentFormat::Docx,
            DocumentFormat::Ppt => DocumentFormat::Pptx,
            other => *other,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// ── Extractor config ─────────────────────────────────────────────────────

/// Configuration for an [`crate::Extractor`].
///
/// Built via [`ExtractorConfig::builder()`] or using
/// [`ExtractorConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_doc2text::ExtractorConfig;
///
/// let config = ExtractorConfig::builder()
///     .max_size_mb(50)
///     .max_chars_for_ai(8_000)
///     .concurrency(8)
///     .build()
///     .unwrap();
/// assert_eq!(config.limits.max_size_bytes, 50 * 1024 * 1024);
/// ```
#[derive(Clone)]
pub struct ExtractorConfig {
    /// Size cap and AI budget. Default: a copy of [`FILE_LIMITS`].
    pub limits: FileLimits,

    /// Explicit pdfium shared-library path. Default: None.
    ///
    /// When unset the extractor tries `./` and then the system library.
    /// pdfium is bound exactly once, when the extractor is built.
    pub pdfium_library_path: Option<PathBuf>,

    /// Maximum files extracted at once by the batch APIs. Default: 4.
    ///
    /// Each in-flight file holds its whole byte buffer plus the decompressed
    /// XML, so this also bounds peak memory.
    pub concurrency: usize,

    /// Optional per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            limits: FILE_LIMITS.clone(),
            pdfium_library_path: None,
            concurrency: 4,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorConfig")
            .field("limits", &self.limits)
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field("concurrency", &self.concurrency)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractorConfig {
    /// Create a new builder for `ExtractorConfig`.
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder {
            config: Self::default(),
            max_size_mb: None,
            max_chars_for_ai: None,
        }
    }
}

/// Builder for [`ExtractorConfig`].
#[derive(Debug)]
pub struct ExtractorConfigBuilder {
    config: ExtractorConfig,
    // Applied on top of `config.limits` in `build()`.
    max_size_mb: Option<u64>,
    max_chars_for_ai: Option<usize>,
}

impl ExtractorConfigBuilder {
    pub fn limits(mut self, limits: FileLimits) -> Self {
        self.config.limits = limits;
        self
    }

    /// Replace the size cap, keeping the AI budget.
    pub fn max_size_mb(mut self, mb: u64) -> Self {
        self.max_size_mb = Some(mb);
        self
    }

    /// Replace the AI budget, keeping the size cap.
    pub fn max_chars_for_ai(mut self, n: usize) -> Self {
        self.max_chars_for_ai = Some(n);
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<ExtractorConfig, ExtractError> {
        if self.max_size_mb.is_some() || self.max_chars_for_ai.is_some() {
            let limits = &self.config.limits;
            self.config.limits = FileLimits::new(
                self.max_size_mb.unwrap_or(limits.max_size_mb),
                self.max_chars_for_ai.unwrap_or(limits.max_chars_for_ai),
            )?;
        }

        let c = &self.config;
        if c.limits.max_size_mb == 0 || c.limits.max_size_bytes == 0 {
            return Err(ExtractError::InvalidConfig(
                "Maximum file size must be ≥ 1 MB".into(),
            ));
        }
        if c.limits.max_chars_for_ai == 0 {
            return Err(ExtractError::InvalidConfig(
                "AI character budget must be ≥ 1".into(),
            ));
        }
        if c.concurrency == 0 {
            return Err(ExtractError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
