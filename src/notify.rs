//! User-facing notices emitted by a [`crate::CaptureSession`].
//!
//! The session never formats presentation strings itself. Each operation
//! reports what happened as a structured [`Notice`]; a [`Notifier`] decides
//! how to show it (toast, terminal line, log record). The CLI renders them on
//! stderr; the default [`TracingNotifier`] turns them into log events.

use crate::error::ItemError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// How prominently a notice should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A structured event describing the outcome of a session operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// A camera stream is live.
    CameraStarted { width: u32, height: u32 },
    /// The camera could not be opened; the session is unchanged.
    CameraUnavailable { detail: String },
    /// The camera stream was released.
    CameraStopped,
    /// A frame was added to the queue.
    Captured { total: usize },
    /// A capture attempt failed; nothing was queued.
    CaptureFailed { detail: String },
    /// More files were selected than the import limit allows.
    TooManyFiles { selected: usize, limit: usize },
    /// A single file was skipped.
    FileSkipped { error: ItemError },
    /// An import batch finished.
    Imported { imported: usize, skipped: usize },
    /// An image was removed from the queue.
    Removed { index: usize, remaining: usize },
    /// Generation was requested with nothing queued.
    EmptyQueue,
    /// A document is ready for preview and download.
    DocumentReady { pages: usize, skipped: usize },
    /// Generation failed; any previous document has been released.
    GenerationFailed { detail: String },
    /// The document was written to disk.
    Exported { path: String },
    /// The session was cleared.
    SessionReset,
}

impl Notice {
    pub fn severity(&self) -> Severity {
        match self {
            Notice::CameraStarted { .. }
            | Notice::CameraStopped
            | Notice::Removed { .. }
            | Notice::SessionReset => Severity::Info,
            Notice::Captured { .. } | Notice::DocumentReady { .. } | Notice::Exported { .. } => {
                Severity::Success
            }
            Notice::Imported { imported, .. } => {
                if *imported > 0 {
                    Severity::Success
                } else {
                    Severity::Warning
                }
            }
            Notice::TooManyFiles { .. } | Notice::FileSkipped { .. } | Notice::EmptyQueue => {
                Severity::Warning
            }
            Notice::CameraUnavailable { .. }
            | Notice::CaptureFailed { .. }
            | Notice::GenerationFailed { .. } => Severity::Error,
        }
    }
}

/// Receives notices from a session.
///
/// Must be `Send + Sync` so a session can be moved into a spawned task.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Drops every notice.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notice: &Notice) {}
}

/// Forwards notices to `tracing` at a level matching their severity.
///
/// This is the default notifier of a new session.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &Notice) {
        match notice.severity() {
            Severity::Info | Severity::Success => info!(?notice, "session notice"),
            Severity::Warning => warn!(?notice, "session notice"),
            Severity::Error => error!(?notice, "session notice"),
        }
    }
}

/// Shared notifier handle stored in a session.
pub type SharedNotifier = Arc<dyn Notifier>;
