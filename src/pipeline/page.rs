//! PDF assembly: one page per embedded JPEG, plus a footer stamp.
//!
//! The document is built directly as a lopdf object graph:
//!
//! ```text
//! Catalog ─▶ Pages ─┬▶ Page ─▶ Contents (q cm Do Q, BT … Tj ET)
//!                   │    └──▶ Resources { XObject /Im0, Font /F1 }
//!                   └▶ Page …
//! ```
//!
//! All pages share one Helvetica font object. PDF coordinates start at the
//! bottom-left corner, so the image offset `(20, 40)` leaves room for the
//! footer line drawn at `(20, 20)`.

use crate::config::PageLayoutConfig;
use crate::pipeline::encode::EncodedImage;
use crate::pipeline::layout::{page_geometry, PageGeometry};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::{debug, warn};

const FONT_KEY: &str = "F1";
const IMAGE_KEY: &str = "Im0";

/// Incrementally builds a multi-page image document.
pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    kids: Vec<Object>,
    layout: PageLayoutConfig,
    /// Footer text in the font's WinAnsi encoding.
    footer: Vec<u8>,
}

impl PdfBuilder {
    pub fn new(layout: PageLayoutConfig, footer: impl AsRef<str>) -> Self {
        let footer = footer.as_ref();
        let encoded = encode_winansi(footer);
        if encoded.replaced > 0 {
            warn!(
                "Footer {:?}: {} character(s) outside WinAnsi replaced with '?'",
                footer, encoded.replaced
            );
        }
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        Self {
            doc,
            pages_id,
            font_id,
            kids: Vec::new(),
            layout,
            footer: encoded.bytes,
        }
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append a page sized for `image` and draw it with the footer.
    ///
    /// Nothing is added to the document if the content stream cannot be
    /// encoded, so a failed page leaves no dangling objects in the page tree.
    pub fn add_image_page(&mut self, image: &EncodedImage) -> Result<PageGeometry, lopdf::Error> {
        let geometry = page_geometry(image.width, image.height, &self.layout);
        let content = self.page_content(&geometry).encode()?;

        let image_stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            image.jpeg.clone(),
        )
        .with_compression(false);
        let image_id = self.doc.add_object(image_stream);
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                real(geometry.page_width),
                real(geometry.page_height),
            ],
            "Resources" => dictionary! {
                "Font" => dictionary! { FONT_KEY => self.font_id },
                "XObject" => dictionary! { IMAGE_KEY => image_id },
            },
            "Contents" => content_id,
        });
        self.kids.push(page_id.into());

        debug!(
            "Page {}: {}x{} px → {:.1}x{:.1} content on {:.1}x{:.1} page",
            self.kids.len(),
            image.width,
            image.height,
            geometry.content_width,
            geometry.content_height,
            geometry.page_width,
            geometry.page_height
        );
        Ok(geometry)
    }

    fn page_content(&self, g: &PageGeometry) -> Content {
        let l = &self.layout;
        let (ix, iy) = l.image_offset;
        let (fx, fy) = l.footer_offset;
        let (r, gr, b) = l.footer_color;
        Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        real(g.content_width),
                        0.into(),
                        0.into(),
                        real(g.content_height),
                        real(ix),
                        real(iy),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_KEY.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
                Operation::new("BT", vec![]),
                Operation::new("rg", vec![real(r), real(gr), real(b)]),
                Operation::new(
                    "Tf",
                    vec![Object::Name(FONT_KEY.as_bytes().to_vec()), real(l.footer_font_size)],
                ),
                Operation::new("Td", vec![real(fx), real(fy)]),
                Operation::new(
                    "Tj",
                    vec![Object::String(self.footer.clone(), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
            ],
        }
    }

    /// Close the page tree and serialise the document.
    pub fn finish(mut self) -> Result<Vec<u8>, lopdf::Error> {
        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        let info_id = self.doc.add_object(dictionary! {
            "Producer" => Object::string_literal(concat!("images-to-pdf ", env!("CARGO_PKG_VERSION"))),
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.trailer.set("Info", info_id);
        self.doc.compress();

        let mut out = Vec::new();
        self.doc.save_to(&mut out)?;
        Ok(out)
    }
}

fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

// ── WinAnsi ──────────────────────────────────────────────────────────────

struct WinAnsiText {
    bytes: Vec<u8>,
    replaced: usize,
}

/// Map `text` onto the standard Helvetica's `WinAnsiEncoding` (cp1252).
///
/// Characters without a code point there become `?`.
fn encode_winansi(text: &str) -> WinAnsiText {
    let mut bytes = Vec::with_capacity(text.len());
    let mut replaced = 0;
    for ch in text.chars() {
        let byte = match ch {
            '\u{0000}'..='\u{007F}' | '\u{00A0}'..='\u{00FF}' => ch as u8,
            '\u{20AC}' => 0x80,
            '\u{201A}' => 0x82,
            '\u{0192}' => 0x83,
            '\u{201E}' => 0x84,
            '\u{2026}' => 0x85,
            '\u{2020}' => 0x86,
            '\u{2021}' => 0x87,
            '\u{02C6}' => 0x88,
            '\u{2030}' => 0x89,
            '\u{0160}' => 0x8A,
            '\u{2039}' => 0x8B,
            '\u{0152}' => 0x8C,
            '\u{017D}' => 0x8E,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{02DC}' => 0x98,
            '\u{2122}' => 0x99,
            '\u{0161}' => 0x9A,
            '\u{203A}' => 0x9B,
            '\u{0153}' => 0x9C,
            '\u{017E}' => 0x9E,
            '\u{0178}' => 0x9F,
            _ => {
                replaced += 1;
                b'?'
            }
        };
        bytes.push(byte);
    }
    WinAnsiText { bytes, replaced }
}
