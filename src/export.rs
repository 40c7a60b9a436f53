//! Export: hand the generated document to the user as a file.
//!
//! Exporting never changes the session. The document stays `Ready` and its
//! transient reference stays live, so it can be exported again.

use crate::error::SessionError;
use crate::notify::Notice;
use crate::session::CaptureSession;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

impl CaptureSession {
    /// Write the ready document into `dir` under the configured output name.
    ///
    /// Returns `Ok(None)` without touching the file system when no document
    /// is ready.
    pub async fn export_document(&self, dir: impl AsRef<Path>) -> Result<Option<PathBuf>, SessionError> {
        let path = dir.as_ref().join(&self.config.output_name);
        self.export_document_to(path).await
    }

    /// Write the ready document to exactly `path`.
    pub async fn export_document_to(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Option<PathBuf>, SessionError> {
        let Some(doc) = self.document() else {
            debug!("Export requested with no ready document");
            return Ok(None);
        };
        let path = path.as_ref();

        // Atomic write: write to temp, then rename
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SessionError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }

        let tmp_path = path.with_extension("pdf.tmp");
        tokio::fs::write(&tmp_path, doc.bytes())
            .await
            .map_err(|e| SessionError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await {
                warn!("Failed to remove {}: {}", tmp_path.display(), cleanup);
            }
            return Err(SessionError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            });
        }

        info!("Exported {} pages to {}", doc.page_count(), path.display());
        self.notify(Notice::Exported {
            path: path.display().to_string(),
        });
        Ok(Some(path.to_path_buf()))
    }
}
