//! End-to-end tests against a real pdfium library and real documents.
//!
//! Documents are read from `./test_cases/`. The tests are gated behind the
//! `E2E_ENABLED` environment variable so they do not run in CI unless
//! explicitly requested; a missing pdfium library or fixture also skips.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test e2e -- --nocapture

use edgequake_doc2text::{
    prepare_stream, DocumentSource, Extractor, ExtractorConfig, FileSource, FILE_LIMITS,
};
use futures::StreamExt;
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

fn output_dir() -> PathBuf {
    let d = test_cases_dir().join("output");
    std::fs::create_dir_all(&d).ok();
    d
}

/// Skip this test if E2E_ENABLED is not set *or* no file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP: test file not found: {}", p.display());
            return;
        }
        p
    }};
}

/// Bind pdfium from `PDFIUM_LIB_PATH` or the default search path, or skip.
macro_rules! pdf_extractor_or_skip {
    () => {{
        let mut builder = ExtractorConfig::builder();
        if let Ok(path) = std::env::var("PDFIUM_LIB_PATH") {
            builder = builder.pdfium_library_path(path);
        }
        match Extractor::new(builder.build().unwrap()) {
            Ok(extractor) => extractor,
            Err(e) => {
                println!("SKIP: {e}");
                return;
            }
        }
    }};
}

fn pdf_fixtures() -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = std::fs::read_dir(test_cases_dir())
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|e| e.path())
                .filter(|p| p.extension().is_some_and(|x| x.eq_ignore_ascii_case("pdf")))
                .collect()
        })
        .unwrap_or_default();
    found.sort();
    found
}

/// Assert the text looks like PDF extraction output.
fn assert_page_framing(text: &str, context: &str) {
    assert!(!text.trim().is_empty(), "[{context}] text is empty");
    assert!(
        text.starts_with("[Page 1]"),
        "[{context}] must start with the first page marker, got: {:?}",
        text.chars().take(40).collect::<String>()
    );

    let mut expected = 1;
    for line in text.lines() {
        if let Some(n) = line
            .strip_prefix("[Page ")
            .and_then(|rest| rest.strip_suffix(']'))
            .and_then(|n| n.parse::<usize>().ok())
        {
            assert_eq!(n, expected, "[{context}] page markers out of order");
            expected += 1;
        }
    }
}

// ── PDF ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_every_fixture_pdf_extracts_framed_pages() {
    let dir = e2e_skip_unless_ready!(test_cases_dir());
    let extractor = pdf_extractor_or_skip!();

    let pdfs = pdf_fixtures();
    if pdfs.is_empty() {
        println!("SKIP: no PDFs in {}", dir.display());
        return;
    }

    for path in pdfs {
        let source = FileSource::open(&path).await.unwrap();
        if source.size() > FILE_LIMITS.max_size_bytes {
            continue;
        }
        let context = path.display().to_string();
        match extractor.extract(&source).await {
            Ok(text) => {
                assert_page_framing(&text, &context);
                let name = path.file_stem().unwrap().to_string_lossy().into_owned();
                std::fs::write(output_dir().join(format!("{name}.txt")), &text).unwrap();
                println!("OK   {context}: {} chars", text.chars().count());
            }
            Err(e) => println!("FAIL {context}: {e}"),
        }
    }
}

#[tokio::test]
async fn e2e_prepare_bounds_long_pdf() {
    let dir = e2e_skip_unless_ready!(test_cases_dir());
    let extractor = pdf_extractor_or_skip!();

    let Some(path) = pdf_fixtures().into_iter().next() else {
        println!("SKIP: no PDFs in {}", dir.display());
        return;
    };
    let source = FileSource::open(&path).await.unwrap();
    let doc = match extractor.prepare(&source).await {
        Ok(doc) => doc,
        Err(e) => {
            println!("SKIP: {} did not extract: {e}", path.display());
            return;
        }
    };

    let budget = FILE_LIMITS.max_chars_for_ai;
    assert_eq!(doc.truncated, doc.stats.char_count > budget);
    if doc.truncated {
        assert!(doc.ai_text.chars().count() > budget);
        let kept: String = doc.text.chars().take(budget).collect();
        assert!(doc.ai_text.starts_with(&kept));
        assert!(doc.ai_text.ends_with("sent to the AI.]"));
    } else {
        assert_eq!(doc.ai_text, doc.text);
    }
    assert!(doc.stats.sections >= 1);
}

#[tokio::test]
async fn e2e_stream_over_fixture_directory() {
    let dir = e2e_skip_unless_ready!(test_cases_dir());
    let extractor = pdf_extractor_or_skip!();

    let mut sources = Vec::new();
    for entry in std::fs::read_dir(&dir).unwrap().filter_map(Result::ok) {
        if entry.path().is_file() {
            sources.push(FileSource::open(entry.path()).await.unwrap());
        }
    }
    let total = sources.len();

    let items: Vec<_> = prepare_stream(&extractor, sources).collect().await;
    assert_eq!(items.len(), total);
    for item in &items {
        match &item.result {
            Ok(doc) => println!("OK   {}: {} chars", item.name, doc.stats.char_count),
            Err(e) => println!("FAIL {}: {e}", item.name),
        }
    }
}
