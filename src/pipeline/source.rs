//! File-like inputs.
//!
//! The sniffer needs the name and size *before* any content is read, so a
//! [`DocumentSource`] exposes both eagerly and reads bytes only on demand.
//! Two implementations ship with the crate: [`MemorySource`] for uploads that
//! are already in memory and [`FileSource`] for local paths.

use crate::error::ExtractError;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Something with a name, a byte length and readable contents.
pub trait DocumentSource: Send + Sync {
    /// File name; only the extension is used for dispatch.
    fn name(&self) -> &str;

    /// Length in bytes, known without reading the contents.
    fn size(&self) -> u64;

    /// Read the whole content.
    fn read_bytes(&self) -> impl Future<Output = io::Result<Vec<u8>>> + Send;

    /// Read the content as text.
    ///
    /// Invalid UTF-8 is replaced rather than rejected and a leading byte-order
    /// mark is dropped, which is what a browser's `File.text()` does.
    fn read_text(&self) -> impl Future<Output = io::Result<String>> + Send {
        async move {
            let bytes = self.read_bytes().await?;
            Ok(decode_text(&bytes))
        }
    }
}

/// Lossy UTF-8 decode without the BOM.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

// ── In-memory ────────────────────────────────────────────────────────────

/// An upload already held in memory.
///
/// Cloning is cheap; the buffer is shared.
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    bytes: Arc<[u8]>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: Arc::from(bytes.into()),
        }
    }
}

impl DocumentSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn read_bytes(&self) -> impl Future<Output = io::Result<Vec<u8>>> + Send {
        let bytes = self.bytes.to_vec();
        async move { Ok(bytes) }
    }
}

// ── Local file ───────────────────────────────────────────────────────────

/// A file on the local filesystem.
///
/// [`FileSource::open`] only reads metadata; contents are loaded through
/// `tokio::fs` when a handler asks for them.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    name: String,
    size: u64,
}

impl FileSource {
    /// Resolve a local path, validating that it exists and is a readable file.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let path = path.as_ref().to_path_buf();

        let metadata = tokio::fs::metadata(&path).await.map_err(|e| match e.kind() {
            io::ErrorKind::PermissionDenied => ExtractError::PermissionDenied { path: path.clone() },
            _ => ExtractError::FileNotFound { path: path.clone() },
        })?;
        if !metadata.is_file() {
            return Err(ExtractError::FileNotFound { path });
        }

        // Opening catches unreadable files before the size check passes them on.
        if let Err(e) = tokio::fs::File::open(&path).await {
            return Err(match e.kind() {
                io::ErrorKind::PermissionDenied => ExtractError::PermissionDenied { path },
                _ => ExtractError::FileNotFound { path },
            });
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        debug!("Resolved local file: {} ({} bytes)", path.display(), metadata.len());
        Ok(Self {
            path,
            name,
            size: metadata.len(),
        })
    }
}

impl DocumentSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn read_bytes(&self) -> impl Future<Output = io::Result<Vec<u8>>> + Send {
        tokio::fs::read(self.path.clone())
    }
}

impl<S: DocumentSource> DocumentSource for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn size(&self) -> u64 {
        (**self).size()
    }

    fn read_bytes(&self) -> impl Future<Output = io::Result<Vec<u8>>> + Send {
        (**self).read_bytes()
    }

    fn read_text(&self) -> impl Future<Output = io::Result<String>> + Send {
        (**self).read_text()
    }
}
