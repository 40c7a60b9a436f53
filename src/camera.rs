//! Camera sources: the device/stream seam and two built-in implementations.
//!
//! A [`CameraDevice`] hands out a live [`CameraStream`] for a requested
//! [`FacingMode`]. The session owns the stream exclusively and must call
//! [`CameraStream::stop_tracks`] on every exit path; both built-in streams
//! also stop their tracks on drop.
//!
//! Opening and grabbing are asynchronous (`BoxFuture`) so a device backed by
//! a platform capture API can suspend while the user answers a permission
//! prompt or while the first frame arrives.
//!
//! * [`PatternCamera`] synthesises test-pattern frames. It can be configured
//!   to refuse permission, to face a given way, or to end its stream after a
//!   number of frames, which makes it the workhorse of the test suite.
//! * [`SnapshotCamera`] re-reads a still image on every grab, for capture
//!   tools that keep overwriting a single snapshot file.

use crate::error::CameraError;
use futures::future::{BoxFuture, FutureExt};
use image::{DynamicImage, ImageBuffer, Rgb};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Which way a camera points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    /// Rear camera, facing away from the user (preferred for documents).
    #[default]
    Environment,
    /// Front camera.
    User,
    /// No preference: any available camera.
    Any,
}

impl FacingMode {
    /// Whether a device facing `self` satisfies a request for `requested`.
    pub fn satisfies(self, requested: FacingMode) -> bool {
        requested == FacingMode::Any || self == FacingMode::Any || self == requested
    }
}

/// A live stream of frames.
pub trait CameraStream: Send {
    /// Current frame size; `None` or a zero axis means no frame yet.
    fn frame_dimensions(&self) -> Option<(u32, u32)>;

    /// Rasterise the current frame.
    ///
    /// Returns [`CameraError::Ended`] when the tracks were stopped.
    fn grab_frame(&mut self) -> BoxFuture<'_, Result<DynamicImage, CameraError>>;

    /// Stop every track. Idempotent.
    fn stop_tracks(&mut self);

    /// `true` until [`Self::stop_tracks`] is called or the source ends.
    fn is_live(&self) -> bool;

    /// Human-readable source name for logs.
    fn label(&self) -> &str;
}

/// Something that can open a [`CameraStream`].
pub trait CameraDevice: Send + Sync {
    fn open(&self, facing: FacingMode) -> BoxFuture<'_, Result<Box<dyn CameraStream>, CameraError>>;
}

// ── PatternCamera ────────────────────────────────────────────────────────

/// A synthetic camera producing gradient test-pattern frames.
#[derive(Debug, Clone)]
pub struct PatternCamera {
    width: u32,
    height: u32,
    facing: FacingMode,
    denied: bool,
    ends_after: Option<usize>,
    live: Arc<AtomicUsize>,
    opens: Arc<AtomicUsize>,
}

impl PatternCamera {
    /// A rear-facing camera producing `width`×`height` frames.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            facing: FacingMode::Environment,
            denied: false,
            ends_after: None,
            live: Arc::new(AtomicUsize::new(0)),
            opens: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn facing(mut self, facing: FacingMode) -> Self {
        self.facing = facing;
        self
    }

    /// Refuse every open request with [`CameraError::PermissionDenied`].
    pub fn denied(mut self) -> Self {
        self.denied = true;
        self
    }

    /// The stream ends on the grab after `frames` successful grabs.
    pub fn ends_after(mut self, frames: usize) -> Self {
        self.ends_after = Some(frames);
        self
    }

    /// Streams opened from this device whose tracks are still running.
    pub fn live_streams(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Number of open requests received, successful or not.
    pub fn open_attempts(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl CameraDevice for PatternCamera {
    fn open(&self, facing: FacingMode) -> BoxFuture<'_, Result<Box<dyn CameraStream>, CameraError>> {
        async move {
            self.opens.fetch_add(1, Ordering::SeqCst);
            if self.denied {
                return Err(CameraError::PermissionDenied(
                    "pattern camera configured to deny access".into(),
                ));
            }
            if !self.facing.satisfies(facing) {
                return Err(CameraError::Unavailable(format!(
                    "pattern camera faces {:?}, {:?} requested",
                    self.facing, facing
                )));
            }
            self.live.fetch_add(1, Ordering::SeqCst);
            debug!("Pattern camera opened ({}x{})", self.width, self.height);
            let stream: Box<dyn CameraStream> = Box::new(PatternStream {
                width: self.width,
                height: self.height,
                frames: 0,
                ends_after: self.ends_after,
                stopped: false,
                live: Arc::clone(&self.live),
            });
            Ok(stream)
        }
        .boxed()
    }
}

struct PatternStream {
    width: u32,
    height: u32,
    frames: usize,
    ends_after: Option<usize>,
    stopped: bool,
    live: Arc<AtomicUsize>,
}

impl CameraStream for PatternStream {
    fn frame_dimensions(&self) -> Option<(u32, u32)> {
        if self.stopped {
            None
        } else {
            Some((self.width, self.height))
        }
    }

    fn grab_frame(&mut self) -> BoxFuture<'_, Result<DynamicImage, CameraError>> {
        async move {
            if self.stopped {
                return Err(CameraError::Ended);
            }
            if self.ends_after.is_some_and(|n| self.frames >= n) {
                self.stop_tracks();
                return Err(CameraError::Ended);
            }
            self.frames += 1;
            let shade = (self.frames * 37 % 256) as u8;
            let (w, h) = (self.width, self.height);
            let buf = ImageBuffer::from_fn(w, h, |x, y| {
                Rgb([
                    (x * 255 / w.max(1)) as u8,
                    (y * 255 / h.max(1)) as u8,
                    shade,
                ])
            });
            Ok(DynamicImage::ImageRgb8(buf))
        }
        .boxed()
    }

    fn stop_tracks(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn is_live(&self) -> bool {
        !self.stopped
    }

    fn label(&self) -> &str {
        "pattern"
    }
}

impl Drop for PatternStream {
    fn drop(&mut self) {
        self.stop_tracks();
    }
}

// ── SnapshotCamera ───────────────────────────────────────────────────────

/// A camera whose current frame is whatever image sits at `path`.
#[derive(Debug, Clone)]
pub struct SnapshotCamera {
    path: PathBuf,
    facing: FacingMode,
}

impl SnapshotCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            facing: FacingMode::Any,
        }
    }

    pub fn facing(mut self, facing: FacingMode) -> Self {
        self.facing = facing;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CameraDevice for SnapshotCamera {
    fn open(&self, facing: FacingMode) -> BoxFuture<'_, Result<Box<dyn CameraStream>, CameraError>> {
        async move {
            if !self.facing.satisfies(facing) {
                return Err(CameraError::Unavailable(format!(
                    "{} faces {:?}, {:?} requested",
                    self.path.display(),
                    self.facing,
                    facing
                )));
            }
            let bytes = read_snapshot(&self.path).await?;
            // An undecodable snapshot is treated as "no frame yet".
            let dims = image::load_from_memory(&bytes)
                .ok()
                .map(|img| (img.width(), img.height()));
            let label = self.path.display().to_string();
            debug!("Snapshot camera opened: {} ({:?})", label, dims);
            let stream: Box<dyn CameraStream> = Box::new(SnapshotStream {
                path: self.path.clone(),
                label,
                dims,
                stopped: false,
            });
            Ok(stream)
        }
        .boxed()
    }
}

async fn read_snapshot(path: &Path) -> Result<Vec<u8>, CameraError> {
    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CameraError::NotFound(path.display().to_string()),
        std::io::ErrorKind::PermissionDenied => {
            CameraError::PermissionDenied(path.display().to_string())
        }
        _ => CameraError::Unavailable(format!("{}: {e}", path.display())),
    })
}

struct SnapshotStream {
    path: PathBuf,
    label: String,
    dims: Option<(u32, u32)>,
    stopped: bool,
}

impl CameraStream for SnapshotStream {
    fn frame_dimensions(&self) -> Option<(u32, u32)> {
        if self.stopped {
            None
        } else {
            self.dims
        }
    }

    fn grab_frame(&mut self) -> BoxFuture<'_, Result<DynamicImage, CameraError>> {
        async move {
            if self.stopped {
                return Err(CameraError::Ended);
            }
            let bytes = match read_snapshot(&self.path).await {
                Ok(b) => b,
                Err(CameraError::NotFound(_)) => {
                    // The capture tool went away: treat as the track ending.
                    self.stop_tracks();
                    return Err(CameraError::Ended);
                }
                Err(e) => return Err(e),
            };
            let img = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
                .await
                .map_err(|e| CameraError::Frame(format!("decode task panicked: {e}")))?
                .map_err(|e| CameraError::Frame(e.to_string()))?;
            self.dims = Some((img.width(), img.height()));
            Ok(img)
        }
        .boxed()
    }

    fn stop_tracks(&mut self) {
        self.stopped = true;
    }

    fn is_live(&self) -> bool {
        !self.stopped
    }

    fn label(&self) -> &str {
        &self.label
    }
}
