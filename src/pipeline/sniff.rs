//! Format sniffing: reject oversized or unsupported uploads before parsing.
//!
//! Runs on metadata only (name and size). A file that fails here never has its
//! contents read.

use crate::config::{DocumentFormat, FileLimits};
use crate::error::ExtractError;

/// The lower-cased substring after the last `.`; empty when there is no dot.
pub fn file_extension(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) => name[idx + 1..].to_lowercase(),
        None => String::new(),
    }
}

/// Validate size, then map the extension to a handler.
pub fn sniff(name: &str, size: u64, limits: &FileLimits) -> Result<DocumentFormat, ExtractError> {
    check_size(size, limits)?;

    let extension = file_extension(name);
    DocumentFormat::from_extension(&extension).ok_or_else(|| ExtractError::UnsupportedFormat {
        extension,
        supported: limits.supported_list(),
    })
}

fn check_size(size: u64, limits: &FileLimits) -> Result<(), ExtractError> {
    if size > limits.max_size_bytes {
        return Err(ExtractError::FileTooLarge {
            size_mb: size as f64 / (1024.0 * 1024.0),
            limit_mb: limits.max_size_mb,
        });
    }
    Ok(())
}

/// Human-readable size: `512 B`, `3.4 KB`, `12.0 MB`.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}
