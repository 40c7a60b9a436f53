//! Import sources: size-check and read a user-selected file.
//!
//! The size ceiling is checked against file metadata before any bytes are
//! read, so an oversized file costs one `stat` rather than a 50 MB read.

use crate::error::ItemError;
use std::path::PathBuf;
use tracing::debug;

/// A file selected for import.
#[derive(Debug, Clone)]
pub enum ImportSource {
    /// A file on the local file system.
    Path(PathBuf),
    /// Bytes already in memory (drag-and-drop, clipboard, tests).
    Memory { name: String, bytes: Vec<u8> },
}

impl ImportSource {
    pub fn memory(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        ImportSource::Memory {
            name: name.into(),
            bytes,
        }
    }

    /// Display name used in notices and page labels.
    pub fn name(&self) -> String {
        match self {
            ImportSource::Path(p) => p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string()),
            ImportSource::Memory { name, .. } => name.clone(),
        }
    }
}

impl From<PathBuf> for ImportSource {
    fn from(p: PathBuf) -> Self {
        ImportSource::Path(p)
    }
}

/// Read the source's bytes, rejecting it if larger than `max_bytes`.
pub async fn read_source(source: ImportSource, max_bytes: u64) -> Result<(String, Vec<u8>), ItemError> {
    let name = source.name();
    match source {
        ImportSource::Memory { bytes, .. } => {
            check_size(&name, bytes.len() as u64, max_bytes)?;
            Ok((name, bytes))
        }
        ImportSource::Path(path) => {
            let meta = tokio::fs::metadata(&path)
                .await
                .map_err(|e| ItemError::ReadFailed {
                    name: name.clone(),
                    detail: e.to_string(),
                })?;
            if !meta.is_file() {
                return Err(ItemError::ReadFailed {
                    name,
                    detail: "not a regular file".into(),
                });
            }
            check_size(&name, meta.len(), max_bytes)?;
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| ItemError::ReadFailed {
                    name: name.clone(),
                    detail: e.to_string(),
                })?;
            // The file may have grown between stat and read.
            check_size(&name, bytes.len() as u64, max_bytes)?;
            debug!("Read {} ({} bytes)", path.display(), bytes.len());
            Ok((name, bytes))
        }
    }
}

fn check_size(name: &str, size: u64, limit: u64) -> Result<(), ItemError> {
    if size > limit {
        Err(ItemError::FileTooLarge {
            name: name.to_string(),
            size,
            limit,
        })
    } else {
        Ok(())
    }
}
