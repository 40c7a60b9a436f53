//! Progress-callback trait for per-image assembly events.
//!
//! Inject an [`Arc<dyn AssemblyProgressCallback>`] via
//! [`crate::CaptureSession::set_progress_callback`] (or pass one to
//! [`crate::assemble::assemble_pdf`]) to receive events as each queued
//! image is turned into a page.
//!
//! # Example
//!
//! ```rust
//! use images_to_pdf::AssemblyProgressCallback;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     pages: Arc<AtomicUsize>,
//! }
//!
//! impl AssemblyProgressCallback for CountingCallback {
//!     fn on_image_complete(&self, index: usize, total: usize, width: f64, height: f64) {
//!         let done = self.pages.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("Image {}/{} → {width}x{height} ({done} pages)", index + 1, total);
//!     }
//! }
//!
//! let cb: Arc<dyn AssemblyProgressCallback> = Arc::new(CountingCallback {
//!     pages: Arc::new(AtomicUsize::new(0)),
//! });
//! cb.on_assembly_start(2);
//! ```

use std::sync::Arc;

/// Called by the assembler as it processes each queued image.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync` because the
/// callback is shared with the blocking encode tasks' owning future.
pub trait AssemblyProgressCallback: Send + Sync {
    /// Called once before the first image is processed.
    ///
    /// # Arguments
    /// * `total_images` — number of queued images
    fn on_assembly_start(&self, total_images: usize) {
        let _ = total_images;
    }

    /// Called just before an image is decoded.
    ///
    /// # Arguments
    /// * `index` — 0-indexed queue position
    /// * `total` — number of queued images
    fn on_image_start(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called when an image has been placed on a page.
    ///
    /// # Arguments
    /// * `index`  — 0-indexed queue position
    /// * `total`  — number of queued images
    /// * `width`, `height` — drawn content dimensions in PDF units
    fn on_image_complete(&self, index: usize, total: usize, width: f64, height: f64) {
        let _ = (index, total, width, height);
    }

    /// Called when an image is skipped.
    ///
    /// `error` is owned so implementations can move it into spawned tasks.
    fn on_image_error(&self, index: usize, total: usize, error: String) {
        let _ = (index, total, error);
    }

    /// Called after each batch, right before yielding to the runtime.
    fn on_batch_yield(&self, processed: usize, total: usize) {
        let _ = (processed, total);
    }

    /// Called once after all images have been attempted.
    ///
    /// # Arguments
    /// * `total_images` — number of queued images
    /// * `page_count`   — pages actually produced
    fn on_assembly_complete(&self, total_images: usize, page_count: usize) {
        let _ = (total_images, page_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl AssemblyProgressCallback for NoopProgressCallback {}

/// Convenience alias for the type stored in a session.
pub type ProgressCallback = Arc<dyn AssemblyProgressCallback>;
