use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;
use super::hash::ContentHash;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Where an upload ended up and what it contained.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    /// Generated name, unique within the store.
    pub filename: String,
    pub path: PathBuf,
    pub size: u64,
    pub content_hash: ContentHash,
}

/// Durable storage for uploaded image files.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Persist `data` under a freshly generated name that keeps the extension
    /// of `original_filename`. The file is fully on disk when this returns.
    async fn save(&self, data: &[u8], original_filename: &str)
    -> Result<StoredUpload, StorageError>;

    /// Open a stored file for streaming.
    async fn open(&self, filename: &str) -> Result<BoxReader, StorageError>;

    /// Remove a stored file.
    ///
    /// Returns `true` if the file was deleted, `false` if it did not exist.
    async fn delete(&self, filename: &str) -> Result<bool, StorageError>;
}
