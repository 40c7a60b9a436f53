//! Page geometry: fit an image's pixel size into the content box.

use crate::config::PageLayoutConfig;
use serde::{Deserialize, Serialize};

/// Where one image lands on its page, in PDF units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub content_width: f64,
    pub content_height: f64,
    pub page_width: f64,
    pub page_height: f64,
}

/// Clip `(width, height)` to the content box, preserving aspect ratio.
///
/// The width constraint is applied first and the height constraint second,
/// against the already width-adjusted size. Images within bounds come back
/// unchanged: one pixel maps to one PDF unit.
pub fn content_dimensions(width: u32, height: u32, layout: &PageLayoutConfig) -> (f64, f64) {
    let mut w = width as f64;
    let mut h = height as f64;
    if w > layout.max_content_width {
        h = h * layout.max_content_width / w;
        w = layout.max_content_width;
    }
    if h > layout.max_content_height {
        w = w * layout.max_content_height / h;
        h = layout.max_content_height;
    }
    (w, h)
}

/// Content dimensions plus the page size that wraps them.
pub fn page_geometry(width: u32, height: u32, layout: &PageLayoutConfig) -> PageGeometry {
    let (cw, ch) = content_dimensions(width, height, layout);
    PageGeometry {
        content_width: cw,
        content_height: ch,
        page_width: cw + layout.margin_width,
        page_height: ch + layout.margin_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> PageLayoutConfig {
        PageLayoutConfig::default()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn within_bounds_is_unscaled() {
        assert_eq!(content_dimensions(640, 480, &layout()), (640.0, 480.0));
        assert_eq!(content_dimensions(752, 552, &layout()), (752.0, 552.0));
    }

    #[test]
    fn wide_image_clipped_by_width_only() {
        let (w, h) = content_dimensions(1504, 500, &layout());
        assert_close(w, 752.0);
        assert_close(h, 250.0);
    }

    #[test]
    fn tall_image_clipped_by_height_only() {
        let (w, h) = content_dimensions(300, 1104, &layout());
        assert_close(h, 552.0);
        assert_close(w, 150.0);
    }

    #[test]
    fn width_then_height() {
        // 1800x1800: width pass → 752x752, height pass → 552x552.
        let (w, h) = content_dimensions(1800, 1800, &layout());
        assert_close(w, 552.0);
        assert_close(h, 552.0);
    }

    #[test]
    fn bounds_and_aspect_hold_for_many_sizes() {
        for &(pw, ph) in &[(4000, 3000), (3000, 4000), (1800, 600), (753, 553), (100, 5000), (9000, 10)] {
            let (w, h) = content_dimensions(pw, ph, &layout());
            assert!(w <= 752.0 + 1e-9 && h <= 552.0 + 1e-9, "{pw}x{ph} → {w}x{h}");
            let src = pw as f64 / ph as f64;
            assert!((w / h - src).abs() / src < 1e-9, "aspect drift for {pw}x{ph}");
        }
    }

    #[test]
    fn page_adds_margins() {
        let g = page_geometry(640, 480, &layout());
        assert_eq!(g.page_width, 680.0);
        assert_eq!(g.page_height, 540.0);
    }
}
