//! Image encoding: `DynamicImage` → baseline RGB JPEG.
//!
//! Every page embeds its image as a JPEG stream with the `DCTDecode` filter,
//! which PDF readers decode natively, so the encoded bytes go into the file
//! untouched. Alpha is flattened away by the RGB conversion. Camera frames
//! and downsampled imports use the same encoder before they are queued.

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tracing::debug;

/// An image ready to be embedded in a page.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Encode `img` as an 8-bit RGB JPEG at `quality` (1–100).
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<EncodedImage, image::ImageError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))?;

    debug!(
        "Encoded {}x{} image → {} bytes JPEG",
        rgb.width(),
        rgb.height(),
        buf.len()
    );

    Ok(EncodedImage {
        jpeg: buf,
        width: rgb.width(),
        height: rgb.height(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_small_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 6, Rgba([255, 0, 0, 128])));
        let data = encode_jpeg(&img, 90).expect("encode should succeed");
        assert_eq!((data.width, data.height), (10, 6));
        // SOI marker
        assert_eq!(&data.jpeg[..2], &[0xFF, 0xD8]);

        let back = image::load_from_memory(&data.jpeg).expect("valid JPEG");
        assert_eq!((back.width(), back.height()), (10, 6));
    }
}
