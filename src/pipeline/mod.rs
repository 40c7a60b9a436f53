//! Pipeline stages shared by import, capture and document assembly.
//!
//! Each submodule implements exactly one transformation step, so every
//! stage can be tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ decode ──▶ encode ──▶ layout ──▶ page
//! (file)   (bitmap,    (canonical  (content   (lopdf page,
//!           downsample) JPEG)       dims)      footer)
//! ```
//!
//! 1. [`input`]  — size-check and read an [`input::ImportSource`]
//! 2. [`decode`] — decode bytes into a bitmap and downsample oversized ones;
//!    CPU-bound, callers run it in `spawn_blocking`
//! 3. [`encode`] — re-encode a bitmap as the baseline RGB JPEG that every
//!    page embeds, whatever the source format was
//! 4. [`layout`] — clip pixel dimensions to the page content box
//! 5. [`page`]   — build the PDF object graph and serialise it

pub mod decode;
pub mod encode;
pub mod input;
pub mod layout;
pub mod page;
