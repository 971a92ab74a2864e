//! Blob sink: best-effort storage of the raw view images.
//!
//! Writes are fault-isolated per view — a failed write is logged and
//! skipped, never failing the run or the other views' writes.

pub mod blob;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::views::{View, ViewImage};

pub use blob::FsBlobStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write blob '{path}': {source}")]
    WriteBlob {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("blob already exists: {0}")]
    BlobExists(PathBuf),
}

/// Reference to one stored view image, carried into the run record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobRef {
    pub view: View,
    pub path: String,
    pub media_type: String,
}

/// A long-lived, concurrency-safe handle to the blob store. Each call
/// writes one view image under a path namespaced by run id and view.
#[async_trait]
pub trait BlobSink: Send + Sync {
    async fn put_view(
        &self,
        run_id: &str,
        view: View,
        image: &ViewImage,
    ) -> Result<BlobRef, StorageError>;
}
