use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("stored file not found: {0}")]
    NotFound(String),

    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored names are generated, so anything that could leave the upload
    /// directory means a corrupted row.
    #[error("invalid stored file name: {0}")]
    InvalidName(String),

    #[error("upload exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
}
