//! Error types for the images-to-pdf library.
//!
//! Three error types reflect three distinct failure scopes:
//!
//! * [`SessionError`] — an operation failed as a whole (camera could not be
//!   opened, the document could not be serialised). Returned as
//!   `Err(SessionError)` from the [`crate::CaptureSession`] entry points.
//!   Every variant is recoverable: the session stays usable and the caller
//!   may simply retry.
//!
//! * [`ItemError`] — a single file or image failed (too large, corrupt) while
//!   the rest of the batch went through. Stored in import reports and
//!   assembly results rather than propagated.
//!
//! * [`CameraError`] — raised by [`crate::camera::CameraDevice`] and
//!   [`crate::camera::CameraStream`] implementations; the session maps it to
//!   a [`SessionError`].

use std::path::PathBuf;
use thiserror::Error;

/// Operation-level errors returned by [`crate::CaptureSession`].
#[derive(Debug, Error)]
pub enum SessionError {
    // ── Camera errors ─────────────────────────────────────────────────────
    /// No camera could be opened, with or without the facing preference.
    #[error("Camera unavailable: {detail}")]
    CameraUnavailable { detail: String },

    /// The user or the platform refused access to the camera.
    #[error("Camera access denied: {detail}\nGrant camera permission and try again.")]
    PermissionDenied { detail: String },

    /// A capture was requested but no frame is available yet.
    #[error("Camera frame not ready (start the camera and wait for the first frame)")]
    FrameNotReady,

    /// The stream ended while a frame was being captured.
    #[error("Camera stopped during capture")]
    CameraStopped,

    /// A grabbed frame could not be turned into a queued image.
    #[error("Capture failed: {detail}")]
    CaptureFailed { detail: String },

    // ── Assembly errors ───────────────────────────────────────────────────
    /// Every queued image failed; the document would have no pages.
    #[error("None of the {total} images could be placed on a page.\nFirst error: {first_error}")]
    NoPagesProduced { total: usize, first_error: String },

    /// lopdf could not serialise the assembled document.
    #[error("Failed to serialise PDF: {detail}")]
    SerializationFailed { detail: String },

    /// The temp file backing a generated document could not be created.
    #[error("Failed to create temporary document file: {source}")]
    TempFile {
        #[source]
        source: std::io::Error,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the exported PDF.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a blocking task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CameraError> for SessionError {
    fn from(e: CameraError) -> Self {
        match e {
            CameraError::PermissionDenied(detail) => SessionError::PermissionDenied { detail },
            CameraError::Ended => SessionError::CameraStopped,
            other => SessionError::CameraUnavailable {
                detail: other.to_string(),
            },
        }
    }
}

/// A non-fatal error for a single file or queued image.
///
/// The surrounding batch continues; the failed item is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum ItemError {
    /// The file exceeds the configured size ceiling.
    #[error("{name}: {size} bytes exceeds the {limit}-byte limit")]
    FileTooLarge { name: String, size: u64, limit: u64 },

    /// The file could not be read from disk.
    #[error("{name}: read failed: {detail}")]
    ReadFailed { name: String, detail: String },

    /// The bytes are not a decodable image.
    #[error("{name}: not a decodable image: {detail}")]
    DecodeFailed { name: String, detail: String },

    /// Re-encoding to the canonical embedding format failed.
    #[error("{name}: encoding failed: {detail}")]
    EncodeFailed { name: String, detail: String },

    /// The image could not be placed on a PDF page.
    #[error("{name}: page {page} could not be built: {detail}")]
    EmbedFailed {
        name: String,
        page: usize,
        detail: String,
    },
}

impl ItemError {
    /// The file name or source label the error refers to.
    pub fn name(&self) -> &str {
        match self {
            ItemError::FileTooLarge { name, .. }
            | ItemError::ReadFailed { name, .. }
            | ItemError::DecodeFailed { name, .. }
            | ItemError::EncodeFailed { name, .. }
            | ItemError::EmbedFailed { name, .. } => name,
        }
    }
}

/// Errors raised by camera devices and streams.
#[derive(Debug, Clone, Error)]
pub enum CameraError {
    /// Access to the device was refused.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// No device exists for the request.
    #[error("no camera found: {0}")]
    NotFound(String),

    /// A device exists but cannot satisfy the request (e.g. wrong facing).
    #[error("camera cannot satisfy request: {0}")]
    Unavailable(String),

    /// The stream's tracks were stopped.
    #[error("camera stream ended")]
    Ended,

    /// A frame could not be read.
    #[error("frame error: {0}")]
    Frame(String),
}
