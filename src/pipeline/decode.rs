//! Decoding and normalising raw image bytes.
//!
//! Everything here is CPU-bound and synchronous; callers move it onto the
//! blocking pool with `tokio::task::spawn_blocking`.

use crate::config::ImportLimits;
use crate::error::ItemError;
use crate::pipeline::encode::encode_jpeg;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

/// An image ready to be queued.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub downsampled: bool,
}

/// Decode any supported container into a bitmap.
pub fn decode_image(name: &str, bytes: &[u8]) -> Result<DynamicImage, ItemError> {
    let img = image::load_from_memory(bytes).map_err(|e| ItemError::DecodeFailed {
        name: name.to_string(),
        detail: e.to_string(),
    })?;
    if img.width() == 0 || img.height() == 0 {
        return Err(ItemError::DecodeFailed {
            name: name.to_string(),
            detail: "image has a zero dimension".into(),
        });
    }
    Ok(img)
}

/// Target size for an image whose longer edge must not exceed `max`.
///
/// Returns `None` when the image already fits.
pub fn downsample_dimensions(width: u32, height: u32, max: u32) -> Option<(u32, u32)> {
    if width <= max && height <= max {
        return None;
    }
    let scale = (max as f64 / width as f64).min(max as f64 / height as f64);
    let w = ((width as f64 * scale).round() as u32).clamp(1, max);
    let h = ((height as f64 * scale).round() as u32).clamp(1, max);
    Some((w, h))
}

/// Decode an imported file and downsample it if it exceeds the limits.
///
/// Images that already fit keep their original bytes; downsampled ones are
/// re-encoded as JPEG at `jpeg_quality`.
pub fn normalize_import(
    name: &str,
    bytes: Vec<u8>,
    limits: &ImportLimits,
    jpeg_quality: u8,
) -> Result<NormalizedImage, ItemError> {
    let img = decode_image(name, &bytes)?;
    let (w, h) = (img.width(), img.height());

    match downsample_dimensions(w, h, limits.max_dimension) {
        None => Ok(NormalizedImage {
            bytes,
            width: w,
            height: h,
            downsampled: false,
        }),
        Some((nw, nh)) => {
            debug!("Downsampling {name}: {w}x{h} → {nw}x{nh}");
            let resized = img.resize_exact(nw, nh, FilterType::Triangle);
            let encoded = encode_jpeg(&resized, jpeg_quality).map_err(|e| ItemError::EncodeFailed {
                name: name.to_string(),
                detail: e.to_string(),
            })?;
            Ok(NormalizedImage {
                bytes: encoded.jpeg,
                width: encoded.width,
                height: encoded.height,
                downsampled: true,
            })
        }
    }
}
