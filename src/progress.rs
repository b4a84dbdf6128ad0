//! Progress-callback trait for per-file extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractorConfigBuilder::progress_callback`] to receive
//! events as the extractor moves each file through its stages. The stages
//! mirror what an upload row shows: reading, extracting, truncating.
//!
//! # Example
//!
//! ```rust
//! use edgequake_doc2text::{ExtractionProgressCallback, ExtractorConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl ExtractionProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, name: &str, chars: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{name}: {chars} chars");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ExtractorConfig::builder()
//!     .progress_callback(counter as Arc<dyn ExtractionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A step in the life of one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Loading the source bytes.
    Reading,
    /// Running the format-specific extractor.
    Extracting,
    /// Capping the text to the AI budget.
    Truncating,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Reading => "Reading…",
            Stage::Extracting => "Extracting…",
            Stage::Truncating => "Truncating…",
        })
    }
}

/// Called by the extractor as it processes each file.
///
/// Implementations must be `Send + Sync`: the batch APIs run several files at
/// once, so every method may be called concurrently for different files. All
/// methods have default no-op implementations.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once before a batch starts.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called when a file enters the pipeline.
    fn on_file_start(&self, name: &str) {
        let _ = name;
    }

    /// Called each time a file moves to a new stage.
    fn on_stage(&self, name: &str, stage: Stage) {
        let _ = (name, stage);
    }

    /// Called when a file produced text.
    ///
    /// `chars` is the character count of the full (untruncated) text.
    fn on_file_complete(&self, name: &str, chars: usize) {
        let _ = (name, chars);
    }

    /// Called when a file failed. `error` is the user-facing message.
    fn on_file_error(&self, name: &str, error: &str) {
        let _ = (name, error);
    }

    /// Called once after every file of a batch has been attempted.
    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let _ = (total_files, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractorConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
