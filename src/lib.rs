//! # images-to-pdf
//!
//! Turn camera captures and imported photos into a single PDF, one image per
//! page, each page sized to its image plus a fixed margin and a small footer.
//!
//! ## Pipeline Overview
//!
//! ```text
//! camera frame ──┐
//!                ├─ 1. Capture  grab a frame, encode JPEG        (capture.rs)
//! image files ───┤
//!                └─ 1. Import   size-check, decode, downsample   (capture.rs)
//!                        │
//!                        ▼
//!                   ImageQueue  ordered, editable                (queue.rs)
//!                        │
//!                        ├─ 2. Encode  canonical JPEG, spawn_blocking
//!                        ├─ 3. Layout  fit into the content box
//!                        ├─ 4. Page    lopdf page + XObject + footer
//!                        └─ 5. Output  bytes + temp file + data URI
//! ```
//!
//! All state lives in one [`CaptureSession`]. Every operation borrows it
//! mutably, so operations never interleave.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use images_to_pdf::{CaptureSession, ImportSource, SessionConfig};
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = CaptureSession::new(SessionConfig::default());
//!     let report = session
//!         .import_files(vec![PathBuf::from("receipt.jpg"), PathBuf::from("page2.png")])
//!         .await;
//!     eprintln!("imported {} ({} skipped)", report.imported, report.skipped.len());
//!
//!     if let Some(doc) = session.generate_document().await? {
//!         eprintln!("{} pages, {} bytes", doc.page_count(), doc.bytes().len());
//!     }
//!     session.export_document(".").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `img2pdf` binary (clap + anyhow + tracing-subscriber + indicatif + serde_json) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! images-to-pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assemble;
pub mod camera;
pub mod capture;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod notify;
pub mod pipeline;
pub mod progress;
pub mod queue;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use assemble::assemble_pdf;
pub use camera::{CameraDevice, CameraStream, FacingMode, PatternCamera, SnapshotCamera};
pub use capture::ImportReport;
pub use config::{ImportLimits, PageLayoutConfig, SessionConfig, SessionConfigBuilder};
pub use document::{AssembledPdf, AssemblyStats, DocumentState, GeneratedDocument, PageRecord};
pub use error::{CameraError, ItemError, SessionError};
pub use notify::{Notice, NoopNotifier, Notifier, Severity, SharedNotifier, TracingNotifier};
pub use pipeline::input::ImportSource;
pub use pipeline::layout::{content_dimensions, PageGeometry};
pub use progress::{AssemblyProgressCallback, NoopProgressCallback, ProgressCallback};
pub use queue::{ImageQueue, PendingImage};
pub use session::{CaptureSession, LoadingFlags, SessionStatus, Tab};
