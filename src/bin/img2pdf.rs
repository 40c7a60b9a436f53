//! CLI binary for images-to-pdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `SessionConfig`, drives one `CaptureSession` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use images_to_pdf::{
    AssemblyProgressCallback, CameraDevice, CaptureSession, FacingMode, ImportSource, Notice,
    Notifier, PatternCamera, ProgressCallback, SessionConfig, Severity, SnapshotCamera,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Renders a progress bar over the assembly run, one log line per image.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} images  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Assembling");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl AssemblyProgressCallback for CliProgressCallback {
    fn on_assembly_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.reset_eta();
    }

    fn on_image_start(&self, index: usize, _total: usize) {
        self.bar.set_message(format!("image {}", index + 1));
    }

    fn on_image_complete(&self, index: usize, total: usize, width: f64, height: f64) {
        self.bar.println(format!(
            "  {} Image {:>3}/{:<3}  {}",
            green("✓"),
            index + 1,
            total,
            dim(&format!("{width:.0} x {height:.0} pt")),
        ));
        self.bar.inc(1);
    }

    fn on_image_error(&self, index: usize, total: usize, error: String) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg = if error.chars().count() > 80 {
            let cut: String = error.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            error
        };

        self.bar.println(format!(
            "  {} Image {:>3}/{:<3}  {}",
            red("✗"),
            index + 1,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_assembly_complete(&self, _total: usize, _page_count: usize) {
        self.bar.finish_and_clear();
    }
}

// ── Terminal notifier ────────────────────────────────────────────────────────

/// Prints session notices to stderr, one line each.
struct CliNotifier {
    quiet: bool,
}

impl Notifier for CliNotifier {
    fn notify(&self, notice: &Notice) {
        let severity = notice.severity();
        if self.quiet && severity != Severity::Error {
            return;
        }
        let text = describe(notice);
        let line = match severity {
            Severity::Info => format!("{} {}", cyan("◆"), text),
            Severity::Success => format!("{} {}", green("✔"), text),
            Severity::Warning => format!("{} {}", yellow("⚠"), yellow(&text)),
            Severity::Error => format!("{} {}", red("✘"), red(&text)),
        };
        eprintln!("{line}");
    }
}

fn describe(notice: &Notice) -> String {
    match notice {
        Notice::CameraStarted { width, height } => format!("Camera started ({width}x{height})"),
        Notice::CameraUnavailable { detail } => format!("Camera unavailable: {detail}"),
        Notice::CameraStopped => "Camera stopped".to_string(),
        Notice::Captured { total } => format!("Captured frame ({total} queued)"),
        Notice::CaptureFailed { detail } => format!("Capture failed: {detail}"),
        Notice::TooManyFiles { selected, limit } => {
            format!("{selected} files selected; only the first {limit} will be imported")
        }
        Notice::FileSkipped { error } => format!("Skipped {}", error),
        Notice::Imported { imported, skipped } => {
            format!("Imported {imported} files ({skipped} skipped)")
        }
        Notice::Removed { index, remaining } => {
            format!("Removed image {} ({remaining} left)", index + 1)
        }
        Notice::EmptyQueue => "Nothing to convert: add at least one image".to_string(),
        Notice::DocumentReady { pages, skipped } => {
            if *skipped == 0 {
                format!("PDF ready: {} pages", bold(&pages.to_string()))
            } else {
                format!(
                    "PDF ready: {} pages ({skipped} images skipped)",
                    bold(&pages.to_string())
                )
            }
        }
        Notice::GenerationFailed { detail } => format!("PDF generation failed: {detail}"),
        Notice::Exported { path } => format!("Saved {}", bold(path)),
        Notice::SessionReset => "Session reset".to_string(),
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Combine photos into ./images-to-pdf.pdf
  img2pdf scan1.jpg scan2.png

  # Write to a specific file
  img2pdf *.jpg -o receipts.pdf

  # Write into a directory (file name from --output-name)
  img2pdf *.jpg -o out/

  # Capture three frames from a snapshot file kept fresh by a capture tool
  img2pdf --camera /tmp/webcam.jpg --captures 3

  # Synthetic test-pattern camera plus two files, dropping the 2nd image
  img2pdf --camera pattern --captures 2 a.png b.png --remove 2

  # Print the PDF as a data: URI instead of writing a file
  img2pdf --preview photo.jpg > preview.txt

  # JSON session summary
  img2pdf --json a.jpg b.jpg

LIMITS:
  At most 10 files per import (the rest are dropped with a warning).
  Files over 5 MB are skipped. Images larger than 1800 px on either side are
  downsampled before queuing. Each page is the image scaled into 752 x 552 pt
  plus a 40 / 60 pt margin, with a small footer.

ENVIRONMENT VARIABLES:
  IMG2PDF_OUTPUT         Output file or directory
  IMG2PDF_CAMERA         Camera source (pattern or snapshot path)
  IMG2PDF_FOOTER         Footer text
  RUST_LOG               Override the log filter
"#;

/// Combine camera captures and image files into a single PDF.
#[derive(Parser, Debug)]
#[command(
    name = "img2pdf",
    version,
    about = "Combine camera captures and image files into a single PDF",
    long_about = "Combine camera captures and image files into one PDF, one image per page. \
Each page is sized to its image (scaled to fit 752 x 552 pt) plus a margin and a footer.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Image files to import, in page order.
    inputs: Vec<PathBuf>,

    /// Output PDF file, or a directory to write the default file name into.
    #[arg(short, long, env = "IMG2PDF_OUTPUT")]
    output: Option<PathBuf>,

    /// Camera source: `pattern` for a synthetic camera, or a snapshot image path.
    #[arg(long, env = "IMG2PDF_CAMERA")]
    camera: Option<String>,

    /// Frames to capture from the camera, before any files are imported.
    #[arg(long, env = "IMG2PDF_CAPTURES", default_value_t = 1)]
    captures: usize,

    /// Preferred camera facing mode.
    #[arg(long, env = "IMG2PDF_FACING", value_enum, default_value = "environment")]
    facing: FacingArg,

    /// Remove queued images by 1-based position before generating.
    #[arg(long, num_args = 1..)]
    remove: Vec<usize>,

    /// Footer text printed on every page.
    #[arg(long, env = "IMG2PDF_FOOTER")]
    footer: Option<String>,

    /// File name used when --output is a directory.
    #[arg(long, env = "IMG2PDF_OUTPUT_NAME")]
    output_name: Option<String>,

    /// Images per assembly batch.
    #[arg(long, env = "IMG2PDF_BATCH_SIZE", default_value_t = 3)]
    batch_size: usize,

    /// Longest side, in pixels, that an imported image may keep.
    #[arg(long, env = "IMG2PDF_MAX_DIMENSION", default_value_t = 1800)]
    max_dimension: u32,

    /// JPEG quality for embedded images (1–100).
    #[arg(long, env = "IMG2PDF_QUALITY", default_value_t = 92,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Print the PDF as a base64 data: URI on stdout instead of writing a file.
    #[arg(long)]
    preview: bool,

    /// Print the session summary as JSON on stdout.
    #[arg(long, env = "IMG2PDF_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "IMG2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "IMG2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "IMG2PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum FacingArg {
    Environment,
    User,
    Any,
}

impl From<FacingArg> for FacingMode {
    fn from(v: FacingArg) -> Self {
        match v {
            FacingArg::Environment => FacingMode::Environment,
            FacingArg::User => FacingMode::User,
            FacingArg::Any => FacingMode::Any,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Notices and the progress bar already cover normal feedback.
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

    let config = build_config(&cli)?;
    let mut session = CaptureSession::new(config).with_notifier(Arc::new(CliNotifier {
        quiet: cli.quiet || cli.json,
    }));

    if show_progress {
        let cb: ProgressCallback = CliProgressCallback::new();
        session.set_progress_callback(Some(cb));
    }

    // ── Camera captures ──────────────────────────────────────────────────
    if let Some(ref source) = cli.camera {
        let device: Box<dyn CameraDevice> = if source.eq_ignore_ascii_case("pattern") {
            Box::new(PatternCamera::new(1280, 720))
        } else {
            Box::new(SnapshotCamera::new(source))
        };
        session
            .start_camera(device.as_ref())
            .await
            .context("Failed to start camera")?;
        for _ in 0..cli.captures {
            session.capture_frame().await.context("Capture failed")?;
        }
        session.stop_camera();
    }

    // ── File import ──────────────────────────────────────────────────────
    if !cli.inputs.is_empty() {
        let sources: Vec<ImportSource> = cli.inputs.iter().cloned().map(ImportSource::from).collect();
        session.import_files(sources).await;
    }

    // ── Queue edits ──────────────────────────────────────────────────────
    // Highest position first so earlier removals don't shift later ones.
    let mut removals = cli.remove.clone();
    removals.sort_unstable_by(|a, b| b.cmp(a));
    removals.dedup();
    for pos in removals {
        if pos == 0 || session.remove_image(pos - 1).is_none() {
            anyhow::bail!(
                "--remove {}: no such image (queue has {})",
                pos,
                session.images().len()
            );
        }
    }

    // ── Generate ─────────────────────────────────────────────────────────
    let doc = session
        .generate_document()
        .await
        .context("PDF generation failed")?;
    if doc.is_none() {
        anyhow::bail!("No images to convert");
    }

    // ── Output ───────────────────────────────────────────────────────────
    let mut written = None;
    if cli.preview {
        if let Some(doc) = session.document() {
            println!("{}", doc.data_uri());
        }
    } else {
        written = match cli.output {
            Some(ref path) if is_pdf_path(path) => session.export_document_to(path).await,
            Some(ref dir) => session.export_document(dir).await,
            None => session.export_document(".").await,
        }
        .context("Failed to write PDF")?;
    }

    if cli.json {
        let summary = serde_json::json!({
            "status": session.status(),
            "images": session.images().as_slice(),
            "pages": session.document().map(|d| d.pages()),
            "skipped": session.document().map(|d| d.skipped()),
            "stats": session.document().map(|d| d.stats()),
            "output": written.as_ref().map(|p| p.display().to_string()),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        if let Some(doc) = session.document() {
            let stats = doc.stats();
            eprintln!(
                "{}  {}/{} pages  {}  {}ms{}",
                if stats.skipped_images == 0 {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                stats.page_count,
                stats.total_images,
                dim(&format!("{} bytes", stats.byte_len)),
                stats.duration_ms,
                written
                    .as_ref()
                    .map(|p| format!("  →  {}", bold(&p.display().to_string())))
                    .unwrap_or_default(),
            );
        }
    }

    Ok(())
}

/// Map CLI args to `SessionConfig`.
fn build_config(cli: &Cli) -> Result<SessionConfig> {
    let mut builder = SessionConfig::builder()
        .batch_size(cli.batch_size)
        .max_dimension(cli.max_dimension)
        .jpeg_quality(cli.quality)
        .preferred_facing(cli.facing.clone().into());

    if let Some(ref footer) = cli.footer {
        builder = builder.footer_text(footer.clone());
    }
    if let Some(ref name) = cli.output_name {
        builder = builder.output_name(name.clone());
    }

    builder.build().context("Invalid configuration")
}

fn is_pdf_path(path: &std::path::Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
