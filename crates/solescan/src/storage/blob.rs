//! Filesystem-backed blob store.
//!
//! Layout: `<root>/uploads/{run_id}/{VIEW}.{ext}`, with the extension
//! derived from the declared media type. Files are created with
//! create-new semantics — run ids are unique, so an existing path is an
//! error rather than something to overwrite.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use tokio::io::AsyncWriteExt;

use crate::views::{View, ViewImage};

use super::{BlobRef, BlobSink, StorageError};

/// Maps a declared media type to a file extension. Common photo types
/// are pinned; anything else falls back to mime_guess, then "bin".
fn extension_for(media_type: &str) -> &str {
    match media_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/heic" => "heic",
        other => mime_guess::get_mime_extensions_str(other)
            .and_then(|exts| exts.first())
            .copied()
            .unwrap_or("bin"),
    }
}

pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, run_id: &str, view: View, media_type: &str) -> PathBuf {
        self.root
            .join("uploads")
            .join(run_id)
            .join(format!("{}.{}", view.label(), extension_for(media_type)))
    }
}

#[async_trait]
impl BlobSink for FsBlobStore {
    async fn put_view(
        &self,
        run_id: &str,
        view: View,
        image: &ViewImage,
    ) -> Result<BlobRef, StorageError> {
        let path = self.blob_path(run_id, view, &image.media_type);
        let dir = path.parent().unwrap_or(&self.root).to_path_buf();

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::CreateDirectory {
                path: dir.clone(),
                source: e,
            })?;

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    StorageError::BlobExists(path.clone())
                } else {
                    StorageError::WriteBlob {
                        path: path.clone(),
                        source: e,
                    }
                }
            })?;

        file.write_all(&image.bytes)
            .await
            .map_err(|e| StorageError::WriteBlob {
                path: path.clone(),
                source: e,
            })?;

        debug!(
            "stored {} bytes for view {} at {}",
            image.bytes.len(),
            view,
            path.display()
        );

        Ok(BlobRef {
            view,
            path: path.display().to_string(),
            media_type: image.media_type.clone(),
        })
    }
}
