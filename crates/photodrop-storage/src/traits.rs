//! Bucket-scoped object storage.
//!
//! The pipeline reads uploads from one bucket and archives into two others; every
//! backend exposes a single bucket through [`Storage`].

use crate::StorageBackend;
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// One instance is bound to exactly one bucket. The pipeline holds three of them
/// (source, thumbnails, finals) and never needs to know which backend sits behind each.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Name of the bucket this store reads from and writes to.
    fn bucket(&self) -> &str;

    /// Which backend serves this bucket.
    fn backend_type(&self) -> StorageBackend;

    /// Publicly addressable URL of an object in this bucket.
    fn public_url(&self, storage_key: &str) -> String;

    /// Read a whole object into memory.
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Upload data to a specific storage key, replacing any existing object.
    /// Returns the public URL for the uploaded object.
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String>;
}
