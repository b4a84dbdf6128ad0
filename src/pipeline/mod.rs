//! Pipeline stages for document text extraction.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and a backend (e.g. the PDF engine) can be swapped without touching
//! the others.
//!
//! ## Data Flow
//!
//! ```text
//! source ──▶ sniff ──┬──▶ pdf ────────────────┬──▶ truncate ──▶ caller
//!                    ├──▶ docx  (doc: legacy) │
//!                    ├──▶ pptx  (ppt: legacy) │
//!                    └──▶ txt ────────────────┘
//! ```
//!
//! 1. [`source`]   : file-like inputs: name, size, lazy byte access
//! 2. [`sniff`]    : size check, then extension → [`crate::DocumentFormat`]
//! 3. [`pdf`]      : per-page text runs via a bound pdfium library
//! 4. [`docx`]     : raw text of `word/document.xml`
//! 5. [`pptx`]     : slide parts in numeric order, markup stripped
//! 6. [`legacy`]   : `.doc` / `.ppt` retried as OOXML, failures rewritten
//! 7. [`truncate`] : cap text to the AI character budget

pub mod docx;
pub mod legacy;
pub mod pdf;
pub mod pptx;
pub mod sniff;
pub mod source;
pub mod truncate;
