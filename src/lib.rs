//! # edgequake-doc2text
//!
//! Extract plain text from uploaded office documents (PDF, DOCX, PPTX, TXT)
//! and bound it for a language model.
//!
//! ## Why this crate?
//!
//! An upload box that feeds a summariser has to answer three questions fast:
//! is this file acceptable, what text is in it, and how much of that text can
//! be sent on. This crate answers them in that order. Oversized and unknown
//! files are rejected from their metadata alone; the format readers produce
//! framed text (`[Page N]`, `[Slide N]`) or a message the uploader can act on;
//! the truncator caps the result and says so visibly.
//!
//! ## Pipeline Overview
//!
//! ```text
//! file
//!  │
//!  ├─ 1. Sniff     size cap, extension → format (no bytes read)
//!  ├─ 2. Read      whole buffer (binary) or decoded string (txt)
//!  ├─ 3. Extract   pdfium pages │ word/document.xml │ slide parts
//!  │               .doc/.ppt: modern path, failures rewritten
//!  └─ 4. Truncate  cap to the AI budget, append a notice
//! ```
//!
//! A separate [`markdown`] module renders the model's Markdown-flavoured
//! replies for display.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_doc2text::{Extractor, ExtractorConfig, FileSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Binds pdfium from ./ or the system; see `Extractor::without_pdf`.
//!     let extractor = Extractor::new(ExtractorConfig::default())?;
//!     let source = FileSource::open("report.pdf").await?;
//!     let doc = extractor.prepare(&source).await?;
//!     println!("{}", doc.ai_text);
//!     eprintln!("{} chars, truncated: {}", doc.stats.char_count, doc.truncated);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc2text` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! edgequake-doc2text = { version = "0.1", default-features = false }
//! ```
//!
//! ## Limits
//!
//! | Limit | Default | Source |
//! |-------|---------|--------|
//! | Upload size | 20 MB | [`FileLimits::max_size_mb`] |
//! | Text sent to the model | 12,000 chars | [`FileLimits::max_chars_for_ai`] |
//!
//! Scanned (image-only) PDFs have no text layer and fail with
//! [`ExtractError::NoExtractableText`]; run OCR first.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod markdown;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DocumentFormat, ExtractorConfig, ExtractorConfigBuilder, FileLimits, FILE_LIMITS};
pub use error::ExtractError;
pub use extract::{write_text_atomic, Extractor};
pub use output::{BatchItem, BatchReport, DocumentStats, PreparedDocument};
pub use pipeline::pdf::{PdfTextBackend, PdfiumBackend, UnavailablePdfBackend};
pub use pipeline::sniff::{file_extension, format_bytes, sniff};
pub use pipeline::source::{DocumentSource, FileSource, MemorySource};
pub use pipeline::truncate::{truncate, truncate_for_ai};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
pub use stream::{prepare_stream, BatchStream};
