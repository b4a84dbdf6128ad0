//! CLI binary for edgequake-doc2text.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractorConfig` and prints results.

use anyhow::{bail, Context, Result};
use clap::Parser;
use edgequake_doc2text::markdown;
use edgequake_doc2text::{
    file_extension, format_bytes, write_text_atomic, BatchReport, DocumentFormat, DocumentSource,
    ExtractError, ExtractionProgressCallback, Extractor, ExtractorConfig, FileSource,
    PreparedDocument, ProgressCallback, Stage, UnavailablePdfBackend,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// One bar over the batch, one log line per finished file. Files finish out
/// of order when several are in flight, so lines are printed as they come.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_files as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Extracting");
    }

    fn on_stage(&self, name: &str, stage: Stage) {
        self.bar.set_message(format!("{name}: {stage}"));
    }

    fn on_file_complete(&self, name: &str, chars: usize) {
        self.bar.println(format!(
            "  {} {:<32}  {}",
            green("✓"),
            name,
            dim(&format!("{chars:>7} chars")),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, name: &str, error: &str) {
        let first_line = error.lines().next().unwrap_or_default();
        let msg = if first_line.chars().count() > 80 {
            format!("{}\u{2026}", first_line.chars().take(79).collect::<String>())
        } else {
            first_line.to_string()
        };

        self.bar
            .println(format!("  {} {:<32}  {}", red("✗"), name, red(&msg)));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let failed = total_files.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} documents extracted",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} documents extracted  ({} failed)",
                if failed == total_files {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_files,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract a document (stdout, capped to the AI budget)
  doc2text report.pdf

  # Full text, no truncation, to a file
  doc2text --full slides.pptx -o slides.txt

  # Several files, JSON with stats
  doc2text --json a.pdf b.docx notes.txt > batch.json

  # Smaller AI budget
  doc2text --max-chars 4000 contract.docx

  # Show the upload limits
  doc2text --limits

  # Render a model reply (Markdown) as HTML or terminal text
  doc2text --render summary.md
  doc2text --render --plain summary.md

SUPPORTED FORMATS:
  .pdf    text layer via pdfium, framed as [Page N]
  .docx   raw text of the document body
  .pptx   slide text in slide order, framed as [Slide N]
  .txt    returned as is
  .doc    only when the file is really a .docx
  .ppt    only when the file is really a .pptx

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  DOC2TEXT_MAX_CHARS      Override the AI character budget
  DOC2TEXT_MAX_SIZE_MB    Override the upload size cap
  DOC2TEXT_CONCURRENCY    Files extracted at once
  RUST_LOG                Log filter (overrides -v / -q)

SETUP:
  PDF extraction needs the pdfium shared library. It is looked up in
  PDFIUM_LIB_PATH, then ./, then the system library path. Without it,
  DOCX, PPTX and TXT still work and PDFs fail with a clear message.
"#;

/// Extract plain text from PDF, Word, PowerPoint and text files.
#[derive(Parser, Debug)]
#[command(
    name = "doc2text",
    version,
    about = "Extract plain text from PDF, Word, PowerPoint and text files",
    long_about = "Extract plain text from office documents, capped to the character budget \
of a language-model call. PDFs are read through pdfium; DOCX and PPTX are read directly \
from their zip packages.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Documents to extract (or Markdown files with --render).
    #[arg(required_unless_present = "limits")]
    inputs: Vec<PathBuf>,

    /// Write the result to this file instead of stdout (single input only).
    #[arg(short, long, env = "DOC2TEXT_OUTPUT")]
    output: Option<PathBuf>,

    /// Print the full text instead of the AI-bounded text.
    #[arg(long, env = "DOC2TEXT_FULL")]
    full: bool,

    /// Characters kept when bounding text for the AI.
    #[arg(long, env = "DOC2TEXT_MAX_CHARS",
          value_parser = clap::value_parser!(u64).range(1..))]
    max_chars: Option<u64>,

    /// Upload size cap in megabytes.
    #[arg(long, env = "DOC2TEXT_MAX_SIZE_MB",
          value_parser = clap::value_parser!(u64).range(1..))]
    max_size_mb: Option<u64>,

    /// Output structured JSON (PreparedDocument per input) instead of text.
    #[arg(long, env = "DOC2TEXT_JSON")]
    json: bool,

    /// Print the upload limits as JSON and exit.
    #[arg(long)]
    limits: bool,

    /// Treat inputs as Markdown and render them as HTML.
    #[arg(long)]
    render: bool,

    /// With --render, print terminal text instead of HTML.
    #[arg(long, requires = "render")]
    plain: bool,

    /// Path to the pdfium library, or a directory containing it.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Number of files extracted at once.
    #[arg(short, long, env = "DOC2TEXT_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Disable progress bar.
    #[arg(long, env = "DOC2TEXT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOC2TEXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOC2TEXT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Limits / render modes ────────────────────────────────────────────
    if cli.limits {
        let config = build_config(&cli, None)?;
        let json = serde_json::to_string_pretty(&config.limits)
            .context("Failed to serialise limits")?;
        println!("{json}");
        return Ok(());
    }

    if cli.render {
        return render_markdown(&cli).await;
    }

    // ── Resolve inputs ───────────────────────────────────────────────────
    let mut sources = Vec::with_capacity(cli.inputs.len());
    for path in &cli.inputs {
        let source = FileSource::open(path)
            .await
            .with_context(|| format!("Cannot open {}", path.display()))?;
        sources.push(source);
    }

    // ── Extract ──────────────────────────────────────────────────────────
    let progress = show_progress.then(CliProgressCallback::new);
    let config = build_config(&cli, progress.clone().map(|cb| cb as ProgressCallback))?;
    let extractor = build_extractor(&cli, config);

    if let Some(ref output_path) = cli.output {
        let [source] = sources.as_slice() else {
            bail!("--output takes exactly one input (got {})", sources.len());
        };

        let start = Instant::now();
        let result = extractor.prepare(source).await;
        if let Some(ref cb) = progress {
            cb.finish();
        }
        let doc = result.with_context(|| format!("Extraction failed for {}", source.name()))?;

        let contents = if cli.json {
            serde_json::to_string_pretty(&doc).context("Failed to serialise output")?
        } else {
            chosen_text(&cli, &doc).to_string()
        };
        write_text_atomic(output_path, &contents)
            .await
            .context("Failed to write output")?;

        if !cli.quiet {
            eprintln!(
                "{}  {} ({})  {} chars{}  {}ms  →  {}",
                green("✔"),
                doc.name,
                format_bytes(doc.stats.size_bytes),
                doc.stats.char_count,
                if doc.truncated && !cli.full {
                    dim(" (truncated for AI)")
                } else {
                    String::new()
                },
                start.elapsed().as_millis(),
                bold(&output_path.display().to_string()),
            );
        }
        return Ok(());
    }

    let total = sources.len();
    let items = extractor.prepare_batch(sources).await;
    let failed = items.iter().filter(|i| !i.is_ok()).count();

    if cli.json {
        let reports: Vec<BatchReport<'_>> = items.iter().map(BatchReport::from).collect();
        let json = if total == 1 {
            serde_json::to_string_pretty(&reports[0])
        } else {
            serde_json::to_string_pretty(&reports)
        }
        .context("Failed to serialise output")?;
        println!("{json}");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        for item in &items {
            match &item.result {
                Ok(doc) => {
                    if total > 1 {
                        writeln!(handle, "==> {} <==", doc.name).context("Failed to write to stdout")?;
                    }
                    let text = chosen_text(&cli, doc);
                    handle
                        .write_all(text.as_bytes())
                        .context("Failed to write to stdout")?;
                    if !text.ends_with('\n') {
                        handle.write_all(b"\n").ok();
                    }
                    if total > 1 {
                        handle.write_all(b"\n").ok();
                    }
                }
                Err(e) if !show_progress => {
                    eprintln!("{} {}: {}", red("✗"), item.name, e);
                }
                Err(_) => {}
            }
        }
    }

    if failed > 0 {
        if total == 1 {
            if let Some(Err(e)) = items.into_iter().next().map(|i| i.result) {
                return Err(e).context("Extraction failed");
            }
        }
        bail!("{failed} of {total} documents failed");
    }
    Ok(())
}

/// Map CLI args to `ExtractorConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractorConfig> {
    let mut builder = ExtractorConfig::builder().concurrency(cli.concurrency);

    if let Some(mb) = cli.max_size_mb {
        builder = builder.max_size_mb(mb);
    }
    if let Some(n) = cli.max_chars {
        let n = usize::try_from(n).context("--max-chars is too large")?;
        builder = builder.max_chars_for_ai(n);
    }
    if let Some(ref path) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(path);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Bind pdfium only when a PDF is requested; other formats never need it.
fn build_extractor(cli: &Cli, config: ExtractorConfig) -> Extractor {
    let wants_pdf = cli.inputs.iter().any(|p| {
        DocumentFormat::from_extension(&file_extension(&p.to_string_lossy()))
            == Some(DocumentFormat::Pdf)
    });
    if !wants_pdf {
        return Extractor::without_pdf(config);
    }

    match Extractor::new(config.clone()) {
        Ok(extractor) => extractor,
        Err(e) => {
            tracing::warn!("{}", e);
            let reason = match e {
                ExtractError::PdfiumBindingFailed(reason) => reason,
                other => other.to_string(),
            };
            Extractor::with_pdf_backend(config, Arc::new(UnavailablePdfBackend::new(reason)))
        }
    }
}

fn chosen_text<'a>(cli: &Cli, doc: &'a PreparedDocument) -> &'a str {
    if cli.full {
        &doc.text
    } else {
        &doc.ai_text
    }
}

async fn render_markdown(cli: &Cli) -> Result<()> {
    let mut rendered = Vec::with_capacity(cli.inputs.len());
    for path in &cli.inputs {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        rendered.push(if cli.plain {
            markdown::to_plain_text(&content)
        } else {
            markdown::to_html(&content)
        });
    }
    let output = rendered.join("\n");

    match cli.output {
        Some(ref path) => write_text_atomic(path, &output)
            .await
            .context("Failed to write output")?,
        None => println!("{output}"),
    }
    Ok(())
}
