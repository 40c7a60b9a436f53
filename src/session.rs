//! The capture session: the single owner of all mutable state.
//!
//! Every operation takes `&mut CaptureSession`, so two operations can never
//! interleave their mutations; the only suspension points are the awaits
//! inside each operation. Camera and import entry points live in
//! [`crate::capture`], export in [`crate::export`]; this module holds the
//! state itself, queue editing, reset and document generation.

use crate::assemble::assemble_pdf;
use crate::camera::CameraStream;
use crate::config::SessionConfig;
use crate::document::{DocumentState, GeneratedDocument};
use crate::error::SessionError;
use crate::notify::{Notice, SharedNotifier, TracingNotifier};
use crate::progress::ProgressCallback;
use crate::queue::{ImageQueue, PendingImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Which input view is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Camera,
    #[default]
    Gallery,
}

/// One busy flag per long-running operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingFlags {
    pub camera: bool,
    pub capture: bool,
    pub import: bool,
    pub generate: bool,
}

/// A serialisable snapshot of the session, for status displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub queued: usize,
    pub camera_active: bool,
    pub document: String,
    pub pages: Option<usize>,
    pub tab: Tab,
    pub loading: LoadingFlags,
    pub last_error: Option<String>,
}

/// Process-wide state: queue, camera handle, output document, UI flags.
pub struct CaptureSession {
    pub(crate) config: SessionConfig,
    pub(crate) queue: ImageQueue,
    pub(crate) camera: Option<Box<dyn CameraStream>>,
    pub(crate) document: DocumentState,
    pub(crate) loading: LoadingFlags,
    pub(crate) last_error: Option<String>,
    pub(crate) tab: Tab,
    pub(crate) frames_captured: usize,
    notifier: SharedNotifier,
    progress: Option<ProgressCallback>,
}

impl fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSession")
            .field("config", &self.config)
            .field("queued", &self.queue.len())
            .field("camera", &self.camera.as_ref().map(|c| c.label().to_string()))
            .field("document", &self.document.name())
            .field("loading", &self.loading)
            .field("last_error", &self.last_error)
            .field("tab", &self.tab)
            .finish()
    }
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl CaptureSession {
    /// A fresh session that reports notices through `tracing`.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            queue: ImageQueue::new(),
            camera: None,
            document: DocumentState::Idle,
            loading: LoadingFlags::default(),
            last_error: None,
            tab: Tab::default(),
            frames_captured: 0,
            notifier: Arc::new(TracingNotifier),
            progress: None,
        }
    }

    pub fn with_notifier(mut self, notifier: SharedNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn set_notifier(&mut self, notifier: SharedNotifier) {
        self.notifier = notifier;
    }

    pub fn set_progress_callback(&mut self, progress: Option<ProgressCallback>) {
        self.progress = progress;
    }

    pub(crate) fn notify(&self, notice: Notice) {
        self.notifier.notify(&notice);
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn images(&self) -> &ImageQueue {
        &self.queue
    }

    pub fn image(&self, index: usize) -> Option<&PendingImage> {
        self.queue.get(index)
    }

    pub fn camera_active(&self) -> bool {
        self.camera.as_ref().is_some_and(|c| c.is_live())
    }

    pub fn document_state(&self) -> &DocumentState {
        &self.document
    }

    pub fn document(&self) -> Option<&GeneratedDocument> {
        self.document.document()
    }

    pub fn loading(&self) -> LoadingFlags {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Forget the last error, as when the user dismisses its message.
    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            queued: self.queue.len(),
            camera_active: self.camera_active(),
            document: self.document.name().to_string(),
            pages: self.document().map(|d| d.page_count()),
            tab: self.tab,
            loading: self.loading,
            last_error: self.last_error.clone(),
        }
    }

    // ── Queue editing ────────────────────────────────────────────────────

    /// Remove the image at `index`. Out-of-range indices are ignored.
    pub fn remove_image(&mut self, index: usize) -> Option<PendingImage> {
        let removed = self.queue.remove(index)?;
        debug!("Removed image {} ({})", index, removed.label);
        self.notify(Notice::Removed {
            index,
            remaining: self.queue.len(),
        });
        Some(removed)
    }

    pub fn clear_images(&mut self) {
        self.queue.clear();
    }

    // ── View / lifecycle ─────────────────────────────────────────────────

    /// Switch the active view; leaving the camera view releases the camera.
    pub fn set_tab(&mut self, tab: Tab) {
        if self.tab == Tab::Camera && tab != Tab::Camera {
            self.stop_camera();
        }
        self.tab = tab;
    }

    /// Release the camera and the document, empty the queue, clear flags.
    pub fn reset(&mut self) {
        self.stop_camera();
        self.queue.clear();
        self.document.transition(DocumentState::Idle);
        self.loading = LoadingFlags::default();
        self.last_error = None;
        self.frames_captured = 0;
        info!("Session reset");
        self.notify(Notice::SessionReset);
    }

    // ── Document generation ──────────────────────────────────────────────

    /// Assemble the queue into a new document.
    ///
    /// With an empty queue this only emits [`Notice::EmptyQueue`] and returns
    /// `Ok(None)`; no state changes. Otherwise the previous document is
    /// released before assembly starts.
    ///
    /// # Errors
    /// Any [`SessionError`] from assembly; the state is then
    /// [`DocumentState::Failed`] and the call may be retried.
    pub async fn generate_document(&mut self) -> Result<Option<&GeneratedDocument>, SessionError> {
        if self.queue.is_empty() {
            self.notify(Notice::EmptyQueue);
            return Ok(None);
        }

        self.document.transition(DocumentState::Generating);
        self.loading.generate = true;

        let result = assemble_pdf(self.queue.as_slice(), &self.config, self.progress.as_ref())
            .await
            .and_then(GeneratedDocument::new);

        self.loading.generate = false;
        match result {
            Ok(doc) => {
                let pages = doc.page_count();
                let skipped = doc.skipped().len();
                self.document = DocumentState::Ready(doc);
                self.last_error = None;
                self.notify(Notice::DocumentReady { pages, skipped });
                Ok(self.document.document())
            }
            Err(e) => {
                let detail = e.to_string();
                self.document = DocumentState::Failed(detail.clone());
                self.last_error = Some(detail.clone());
                self.notify(Notice::GenerationFailed { detail });
                Err(e)
            }
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            camera.stop_tracks();
            debug!("Camera released on teardown");
        }
    }
}
