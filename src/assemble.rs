//! Document assembly: queued images → one multi-page PDF.
//!
//! Images are processed in fixed-size batches. Within a batch each image is
//! decoded and re-encoded on the blocking pool, one after another, so pages
//! come out in queue order; after every batch the task yields to the runtime
//! so other work on the same thread (UI events, camera frames) keeps moving.
//!
//! A failure on one image skips that image only. The run as a whole fails
//! only when serialisation fails or when not a single page could be built.

use crate::config::SessionConfig;
use crate::document::{AssembledPdf, AssemblyStats, PageRecord};
use crate::error::{ItemError, SessionError};
use crate::pipeline::decode::decode_image;
use crate::pipeline::encode::{encode_jpeg, EncodedImage};
use crate::pipeline::page::PdfBuilder;
use crate::progress::ProgressCallback;
use crate::queue::PendingImage;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Assemble `images` into a PDF, one page per image that can be decoded.
///
/// # Returns
/// `Ok(AssembledPdf)` when at least one page was produced, even if other
/// images were skipped (see `AssembledPdf::skipped`).
///
/// # Errors
/// - [`SessionError::NoPagesProduced`] — `images` is empty or every image failed
/// - [`SessionError::SerializationFailed`] — lopdf could not write the file
/// - [`SessionError::Internal`] — a blocking task panicked
pub async fn assemble_pdf(
    images: &[PendingImage],
    config: &SessionConfig,
    progress: Option<&ProgressCallback>,
) -> Result<AssembledPdf, SessionError> {
    let start = Instant::now();
    let total = images.len();
    info!("Assembling {} images (batch size {})", total, config.batch_size);

    if let Some(cb) = progress {
        cb.on_assembly_start(total);
    }

    let mut builder = PdfBuilder::new(config.layout, config.footer_text.clone());
    let mut pages = Vec::with_capacity(total);
    let mut skipped = Vec::new();
    let mut batches = 0;

    for (batch_idx, batch) in images.chunks(config.batch_size.max(1)).enumerate() {
        for (offset, image) in batch.iter().enumerate() {
            let index = batch_idx * config.batch_size.max(1) + offset;
            if let Some(cb) = progress {
                cb.on_image_start(index, total);
            }

            match place_image(&mut builder, image, index, config.jpeg_quality).await? {
                Ok(record) => {
                    if let Some(cb) = progress {
                        cb.on_image_complete(
                            index,
                            total,
                            record.geometry.content_width,
                            record.geometry.content_height,
                        );
                    }
                    pages.push(record);
                }
                Err(e) => {
                    warn!("Skipping image {} ({}): {}", index + 1, image.label, e);
                    if let Some(cb) = progress {
                        cb.on_image_error(index, total, e.to_string());
                    }
                    skipped.push(e);
                }
            }
        }

        batches += 1;
        let processed = (batch_idx * config.batch_size.max(1) + batch.len()).min(total);
        if let Some(cb) = progress {
            cb.on_batch_yield(processed, total);
        }
        debug!("Batch {} done ({}/{}), yielding", batches, processed, total);
        tokio::task::yield_now().await;
    }

    if let Some(cb) = progress {
        cb.on_assembly_complete(total, pages.len());
    }

    if pages.is_empty() {
        let first_error = skipped
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no images queued".to_string());
        return Err(SessionError::NoPagesProduced { total, first_error });
    }

    let bytes = builder
        .finish()
        .map_err(|e| SessionError::SerializationFailed {
            detail: e.to_string(),
        })?;

    let stats = AssemblyStats {
        total_images: total,
        page_count: pages.len(),
        skipped_images: skipped.len(),
        batches,
        byte_len: bytes.len(),
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Assembled {}/{} pages, {} bytes in {}ms",
        stats.page_count, total, stats.byte_len, stats.duration_ms
    );

    Ok(AssembledPdf {
        bytes,
        pages,
        skipped,
        stats,
    })
}

/// Decode, re-encode and place one image.
///
/// The outer `Result` carries run-level failures (a panicked task), the
/// inner one per-image failures that only skip this image.
async fn place_image(
    builder: &mut PdfBuilder,
    image: &PendingImage,
    index: usize,
    jpeg_quality: u8,
) -> Result<Result<PageRecord, ItemError>, SessionError> {
    let label = image.label.clone();
    let bytes = image.bytes.clone();

    let encoded = tokio::task::spawn_blocking(move || canonicalize(&label, &bytes, jpeg_quality))
        .await
        .map_err(|e| SessionError::Internal(format!("Encode task panicked: {}", e)))?;

    let encoded = match encoded {
        Ok(enc) => enc,
        Err(e) => return Ok(Err(e)),
    };

    let page_num = builder.page_count() + 1;
    Ok(builder
        .add_image_page(&encoded)
        .map(|geometry| PageRecord {
            page_num,
            queue_index: index,
            label: image.label.clone(),
            pixel_width: encoded.width,
            pixel_height: encoded.height,
            geometry,
        })
        .map_err(|e| ItemError::EmbedFailed {
            name: image.label.clone(),
            page: page_num,
            detail: e.to_string(),
        }))
}

/// Decode any source format and re-encode it as the embedded JPEG.
fn canonicalize(label: &str, bytes: &[u8], jpeg_quality: u8) -> Result<EncodedImage, ItemError> {
    let img = decode_image(label, bytes)?;
    encode_jpeg(&img, jpeg_quality).map_err(|e| ItemError::EncodeFailed {
        name: label.to_string(),
        detail: e.to_string(),
    })
}
