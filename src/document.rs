//! Generated documents and the generation state machine.
//!
//! A [`GeneratedDocument`] owns the PDF bytes plus a *transient reference*:
//! a temporary file holding the same bytes, which a viewer can open for
//! preview and which the session hands out for download. The temp file is
//! deleted when the document is [released](GeneratedDocument::release) or
//! dropped, so repeated generate/reset cycles never accumulate files.

use crate::error::{ItemError, SessionError};
use crate::pipeline::layout::PageGeometry;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// One produced page, in queue order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// 1-indexed page number in the output.
    pub page_num: usize,
    /// Position of the source image in the queue.
    pub queue_index: usize,
    pub label: String,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub geometry: PageGeometry,
}

/// Summary of one assembly run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblyStats {
    pub total_images: usize,
    pub page_count: usize,
    pub skipped_images: usize,
    pub batches: usize,
    pub byte_len: usize,
    pub duration_ms: u64,
}

/// Output of [`crate::assemble::assemble_pdf`] before it is wrapped in a
/// transient reference.
#[derive(Debug, Clone)]
pub struct AssembledPdf {
    pub bytes: Vec<u8>,
    pub pages: Vec<PageRecord>,
    pub skipped: Vec<ItemError>,
    pub stats: AssemblyStats,
}

/// A complete PDF and its transient reference.
#[derive(Debug)]
pub struct GeneratedDocument {
    bytes: Vec<u8>,
    pages: Vec<PageRecord>,
    skipped: Vec<ItemError>,
    stats: AssemblyStats,
    file: Option<NamedTempFile>,
}

impl GeneratedDocument {
    /// Write `pdf` to a fresh temp file and take ownership of both.
    pub fn new(pdf: AssembledPdf) -> Result<Self, SessionError> {
        let mut file = tempfile::Builder::new()
            .prefix("images-to-pdf-")
            .suffix(".pdf")
            .tempfile()
            .map_err(|source| SessionError::TempFile { source })?;
        file.write_all(&pdf.bytes)
            .and_then(|_| file.flush())
            .map_err(|source| SessionError::TempFile { source })?;
        debug!("Document staged at {}", file.path().display());

        Ok(Self {
            bytes: pdf.bytes,
            pages: pdf.pages,
            skipped: pdf.skipped,
            stats: pdf.stats,
            file: Some(file),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[PageRecord] {
        &self.pages
    }

    /// Images that could not be placed on a page.
    pub fn skipped(&self) -> &[ItemError] {
        &self.skipped
    }

    pub fn stats(&self) -> &AssemblyStats {
        &self.stats
    }

    /// Path of the temp file backing this document, while it is live.
    pub fn preview_path(&self) -> Option<&Path> {
        self.file.as_ref().map(|f| f.path())
    }

    /// An inline `data:` URI for embedding the document in a viewer.
    pub fn data_uri(&self) -> String {
        format!("data:application/pdf;base64,{}", STANDARD.encode(&self.bytes))
    }

    pub fn is_released(&self) -> bool {
        self.file.is_none()
    }

    /// Delete the temp file. Returns the path that was released, if any.
    pub fn release(&mut self) -> Option<PathBuf> {
        let file = self.file.take()?;
        let path = file.path().to_path_buf();
        if let Err(e) = file.close() {
            debug!("Failed to remove {}: {}", path.display(), e);
        }
        debug!("Released document {}", path.display());
        Some(path)
    }
}

/// Lifecycle of the session's output document.
///
/// ```text
/// Idle ──▶ Generating ──▶ Ready ──(new request)──▶ Generating
///                    └──▶ Failed ──(retry)───────▶ Generating
/// any ──(reset)──▶ Idle
/// ```
#[derive(Debug, Default)]
pub enum DocumentState {
    #[default]
    Idle,
    Generating,
    Ready(GeneratedDocument),
    Failed(String),
}

impl DocumentState {
    pub fn document(&self) -> Option<&GeneratedDocument> {
        match self {
            DocumentState::Ready(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, DocumentState::Ready(_))
    }

    /// Short name for logs and JSON summaries.
    pub fn name(&self) -> &'static str {
        match self {
            DocumentState::Idle => "idle",
            DocumentState::Generating => "generating",
            DocumentState::Ready(_) => "ready",
            DocumentState::Failed(_) => "failed",
        }
    }

    /// Release any live document and move to `next`.
    pub(crate) fn transition(&mut self, next: DocumentState) {
        if let DocumentState::Ready(doc) = self {
            doc.release();
        }
        *self = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(bytes: &[u8]) -> AssembledPdf {
        AssembledPdf {
            bytes: bytes.to_vec(),
            pages: vec![],
            skipped: vec![],
            stats: AssemblyStats::default(),
        }
    }

    #[test]
    fn temp_file_holds_bytes_until_release() {
        let mut doc = GeneratedDocument::new(pdf(b"%PDF-1.7 test")).unwrap();
        let path = doc.preview_path().unwrap().to_path_buf();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7 test");

        assert_eq!(doc.release(), Some(path.clone()));
        assert!(!path.exists());
        assert!(doc.is_released());
        assert_eq!(doc.release(), None);
        // Bytes survive the release.
        assert_eq!(doc.bytes(), b"%PDF-1.7 test");
    }

    #[test]
    fn data_uri_prefix() {
        let doc = GeneratedDocument::new(pdf(b"abc")).unwrap();
        assert_eq!(doc.data_uri(), "data:application/pdf;base64,YWJj");
    }

    #[test]
    fn transition_releases_ready_document() {
        let doc = GeneratedDocument::new(pdf(b"x")).unwrap();
        let path = doc.preview_path().unwrap().to_path_buf();
        let mut state = DocumentState::Ready(doc);
        state.transition(DocumentState::Generating);
        assert!(!path.exists());
        assert_eq!(state.name(), "generating");
        assert!(state.document().is_none());
    }
}
