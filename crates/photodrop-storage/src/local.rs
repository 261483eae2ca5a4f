use crate::keys::{join_url, validate_key};
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Each bucket maps to a directory `{base_path}/{bucket}`; objects are served from
/// `{base_url}/{bucket}/{key}`.
#[derive(Clone)]
pub struct LocalStorage {
    bucket: String,
    bucket_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Open (creating if needed) the directory backing `bucket`.
    ///
    /// # Arguments
    /// * `base_path` - Root directory holding one directory per bucket (e.g. "/var/lib/photodrop")
    /// * `base_url` - Base URL the root is served from (e.g. "http://localhost:8080/media")
    /// * `bucket` - Bucket name
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: String,
        bucket: impl Into<String>,
    ) -> StorageResult<Self> {
        let bucket = bucket.into();
        validate_key(&bucket)?;
        let bucket_path = base_path.into().join(&bucket);

        fs::create_dir_all(&bucket_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                bucket_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            bucket,
            bucket_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path, rejecting traversal outside the bucket.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;
        Ok(self.bucket_path.join(storage_key))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }

    fn public_url(&self, storage_key: &str) -> String {
        join_url(&self.base_url, &self.bucket, storage_key)
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        let data = fs::read(&path)
            .await
            .map_err(|e| StorageError::DownloadFailed(format!("{}: {}", path.display(), e)))?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage download successful"
        );

        Ok(data)
    }

    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        let size = data.len();
        let start = std::time::Instant::now();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write next to the target and rename so readers never see a partial object.
        let mut staging = path.clone().into_os_string();
        staging.push(".partial");
        let staging = PathBuf::from(staging);
        let mut file = fs::File::create(&staging).await.map_err(|e| {
            StorageError::UploadFailed(format!("{}: {}", staging.display(), e))
        })?;
        file.write_all(&data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&staging, &path).await.map_err(|e| {
            StorageError::UploadFailed(format!("{} -> {}: {}", staging.display(), path.display(), e))
        })?;

        let url = self.public_url(storage_key);

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(url)
    }
}
