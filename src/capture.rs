//! Capture sources: camera control, frame capture and file import.
//!
//! These are [`CaptureSession`] entry points. Each one either appends to the
//! queue or reports a recoverable failure; none of them touches the output
//! document.

use crate::camera::{CameraDevice, CameraStream, FacingMode};
use crate::error::{CameraError, ItemError, SessionError};
use crate::notify::Notice;
use crate::pipeline::decode::{normalize_import, NormalizedImage};
use crate::pipeline::encode::encode_jpeg;
use crate::pipeline::input::{read_source, ImportSource};
use crate::session::{CaptureSession, Tab};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Outcome of one [`CaptureSession::import_files`] call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    /// Files selected by the caller.
    pub selected: usize,
    /// Files dropped because the selection exceeded the file limit.
    pub truncated: usize,
    /// Files appended to the queue.
    pub imported: usize,
    /// Files that were attempted but skipped.
    pub skipped: Vec<ItemError>,
    /// Of the imported files, how many were downsampled.
    pub downsampled: usize,
}

impl CaptureSession {
    // ── Camera ───────────────────────────────────────────────────────────

    /// Open a camera stream, preferring the configured facing mode and
    /// falling back to any camera. A permission refusal is not retried.
    ///
    /// An active camera is replaced only once the new stream opens. On
    /// failure the previous camera, queue and document are untouched; the
    /// error is recorded as the last error and reported as
    /// [`Notice::CameraUnavailable`].
    pub async fn start_camera(&mut self, device: &dyn CameraDevice) -> Result<(), SessionError> {
        self.loading.camera = true;

        let preferred = self.config.preferred_facing;
        let opened = match device.open(preferred).await {
            Ok(stream) => Ok(stream),
            Err(e) if preferred != FacingMode::Any && !matches!(e, CameraError::PermissionDenied(_)) => {
                debug!("No {:?} camera ({}), falling back to any camera", preferred, e);
                device.open(FacingMode::Any).await
            }
            Err(e) => Err(e),
        };

        self.loading.camera = false;
        match opened {
            Ok(stream) => {
                let (width, height) = stream.frame_dimensions().unwrap_or((0, 0));
                info!("Camera started: {} ({}x{})", stream.label(), width, height);
                self.release_camera();
                self.camera = Some(stream);
                self.tab = Tab::Camera;
                self.last_error = None;
                self.notify(Notice::CameraStarted { width, height });
                Ok(())
            }
            Err(e) => {
                let err = SessionError::from(e);
                warn!("Camera unavailable: {}", err);
                self.last_error = Some(err.to_string());
                self.notify(Notice::CameraUnavailable {
                    detail: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Stop every track of the active stream. A no-op without a camera.
    ///
    /// Returns whether a camera was released.
    pub fn stop_camera(&mut self) -> bool {
        if self.release_camera() {
            self.notify(Notice::CameraStopped);
            true
        } else {
            false
        }
    }

    fn release_camera(&mut self) -> bool {
        match self.camera.take() {
            Some(mut stream) => {
                stream.stop_tracks();
                debug!("Camera released: {}", stream.label());
                true
            }
            None => false,
        }
    }

    /// Rasterise the current frame and append it to the queue.
    ///
    /// Returns the new queue length.
    ///
    /// # Errors
    /// - [`SessionError::FrameNotReady`] — no live camera, or no frame yet;
    ///   a camera that is no longer live is released
    /// - [`SessionError::CameraStopped`] — the stream ended mid-capture; the
    ///   camera is released
    /// - [`SessionError::CaptureFailed`] — the frame could not be encoded
    pub async fn capture_frame(&mut self) -> Result<usize, SessionError> {
        self.loading.capture = true;
        let result = self.try_capture().await;
        self.loading.capture = false;

        match result {
            Ok(total) => {
                self.notify(Notice::Captured { total });
                Ok(total)
            }
            Err(e) => {
                if matches!(e, SessionError::CameraStopped) {
                    self.release_camera();
                }
                warn!("Capture failed: {}", e);
                self.last_error = Some(e.to_string());
                self.notify(Notice::CaptureFailed {
                    detail: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn try_capture(&mut self) -> Result<usize, SessionError> {
        let quality = self.config.jpeg_quality;
        if self.camera.as_ref().is_some_and(|s| !s.is_live()) {
            self.release_camera();
            return Err(SessionError::FrameNotReady);
        }
        let stream: &mut Box<dyn CameraStream> =
            self.camera.as_mut().ok_or(SessionError::FrameNotReady)?;

        match stream.frame_dimensions() {
            Some((w, h)) if w > 0 && h > 0 => {}
            _ => return Err(SessionError::FrameNotReady),
        }

        let frame = stream.grab_frame().await?;
        let encoded = tokio::task::spawn_blocking(move || encode_jpeg(&frame, quality))
            .await
            .map_err(|e| SessionError::Internal(format!("Frame encode task panicked: {}", e)))?
            .map_err(|e| SessionError::CaptureFailed {
                detail: e.to_string(),
            })?;

        self.frames_captured += 1;
        let label = format!("camera-frame-{}", self.frames_captured);
        debug!("Captured {} ({}x{})", label, encoded.width, encoded.height);
        self.queue
            .push(label, encoded.width, encoded.height, encoded.jpeg);
        Ok(self.queue.len())
    }

    // ── Files ────────────────────────────────────────────────────────────

    /// Import up to `max_files` files into the queue.
    ///
    /// Each file is size-checked, decoded and, if needed, downsampled on its
    /// own; a bad file is reported with [`Notice::FileSkipped`] and never
    /// stops the others. Files are read and decoded concurrently but are
    /// appended in selection order.
    pub async fn import_files<I>(&mut self, sources: I) -> ImportReport
    where
        I: IntoIterator,
        I::Item: Into<ImportSource>,
    {
        let limits = self.config.import;
        let quality = self.config.jpeg_quality;

        let mut sources: Vec<ImportSource> = sources.into_iter().map(Into::into).collect();
        let selected = sources.len();
        let mut report = ImportReport {
            selected,
            ..ImportReport::default()
        };

        if selected > limits.max_files {
            report.truncated = selected - limits.max_files;
            sources.truncate(limits.max_files);
            warn!(
                "{} files selected, importing the first {}",
                selected, limits.max_files
            );
            self.notify(Notice::TooManyFiles {
                selected,
                limit: limits.max_files,
            });
        }

        self.loading.import = true;
        let results: Vec<Result<(String, NormalizedImage), ItemError>> = stream::iter(
            sources.into_iter().map(move |source| async move {
                let (name, bytes) = read_source(source, limits.max_file_bytes).await?;
                let task_name = name.clone();
                let image = tokio::task::spawn_blocking(move || {
                    normalize_import(&task_name, bytes, &limits, quality)
                })
                .await
                .map_err(|e| ItemError::DecodeFailed {
                    name: name.clone(),
                    detail: format!("decode task panicked: {e}"),
                })??;
                Ok::<_, ItemError>((name, image))
            }),
        )
        .buffered(self.config.import_concurrency.max(1))
        .collect()
        .await;
        self.loading.import = false;

        for result in results {
            match result {
                Ok((name, image)) => {
                    if image.downsampled {
                        report.downsampled += 1;
                    }
                    self.queue.push(name, image.width, image.height, image.bytes);
                    report.imported += 1;
                }
                Err(e) => {
                    warn!("Skipping file: {}", e);
                    self.notify(Notice::FileSkipped { error: e.clone() });
                    report.skipped.push(e);
                }
            }
        }

        info!(
            "Imported {}/{} files ({} skipped, {} truncated)",
            report.imported,
            selected,
            report.skipped.len(),
            report.truncated
        );
        self.notify(Notice::Imported {
            imported: report.imported,
            skipped: report.skipped.len(),
        });
        report
    }
}
