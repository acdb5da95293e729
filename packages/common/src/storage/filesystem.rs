use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::io::BufReader;

use super::error::StorageError;
use super::hash::ContentHash;
use super::traits::{BoxReader, StoredUpload, UploadStore};

/// Filesystem-backed upload store.
///
/// Files land flat in `base_path` as `{YYYYmmdd_HHMMSS}_{8 hex}{.ext}`. Writes
/// go to `{base_path}/.tmp` first and are renamed into place.
pub struct FilesystemUploadStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemUploadStore {
    /// Create a new filesystem upload store.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn file_path(&self, filename: &str) -> Result<PathBuf, StorageError> {
        if filename.is_empty()
            || filename.starts_with('.')
            || filename.contains(['/', '\\', '\0'])
        {
            return Err(StorageError::InvalidName(filename.to_string()));
        }
        Ok(self.base_path.join(filename))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

/// `20250101_120000_1a2b3c4d.jpg`-style name; the extension is kept only when
/// it is plain alphanumeric.
fn generate_name(original_filename: &str) -> String {
    let ext = Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();
    let unique = uuid::Uuid::new_v4().simple().to_string();

    format!(
        "{}_{}{}",
        Utc::now().format("%Y%m%d_%H%M%S"),
        &unique[..8],
        ext
    )
}

#[async_trait]
impl UploadStore for FilesystemUploadStore {
    async fn save(
        &self,
        data: &[u8],
        original_filename: &str,
    ) -> Result<StoredUpload, StorageError> {
        let size = data.len() as u64;
        if size > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: size,
                limit: self.max_size,
            });
        }

        let filename = generate_name(original_filename);
        let path = self.file_path(&filename)?;

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &path).await {
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                tracing::warn!(path = %temp_path.display(), error = %cleanup, "Failed to remove temp upload");
            }
            return Err(e.into());
        }
        tracing::debug!(%filename, size, "Stored upload");

        Ok(StoredUpload {
            filename,
            path,
            size,
            content_hash: ContentHash::compute(data),
        })
    }

    async fn open(&self, filename: &str) -> Result<BoxReader, StorageError> {
        let path = self.file_path(filename)?;
        match fs::File::open(&path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, filename: &str) -> Result<bool, StorageError> {
        let path = self.file_path(filename)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
