#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use photodrop_core::Config;
use std::sync::Arc;

/// The three stores an ingest pipeline works with.
#[derive(Clone)]
pub struct BucketStores {
    pub source: Arc<dyn Storage>,
    pub thumbnails: Arc<dyn Storage>,
    pub finals: Arc<dyn Storage>,
}

/// Create stores for the configured source, thumbnail and final buckets.
pub async fn create_bucket_stores(config: &Config) -> StorageResult<BucketStores> {
    let pipeline = config.pipeline_config();
    let stores = BucketStores {
        source: create_storage(config, &pipeline.source_bucket).await?,
        thumbnails: create_storage(config, &pipeline.thumbnails_bucket).await?,
        finals: create_storage(config, &pipeline.finals_bucket).await?,
    };

    for store in [&stores.source, &stores.thumbnails, &stores.finals] {
        tracing::info!(
            bucket = %store.bucket(),
            backend = %store.backend_type(),
            "Storage ready"
        );
    }
    Ok(stores)
}

/// Create a storage backend for one bucket based on configuration
pub async fn create_storage(config: &Config, bucket: &str) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let region = config.s3_region().map(String::from).ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            let storage = S3Storage::new(
                bucket.to_string(),
                region,
                config.s3_endpoint.clone(),
                config.public_url_host.clone(),
            )
            .await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config.local_storage_base_url.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;

            let storage = LocalStorage::new(base_path, base_url, bucket).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_create_local_bucket_stores() {
        let dir = tempdir().unwrap();
        let root = dir.path().to_string_lossy().to_string();
        let env = HashMap::from([
            ("PROJECT_ID", "photodrop-test".to_string()),
            ("SOURCE_BUCKET", "uploads".to_string()),
            ("THUMBNAILS_BUCKET", "thumbnails".to_string()),
            ("FINALS_BUCKET", "finals".to_string()),
            ("DATABASE_URL", "postgres://localhost/photodrop".to_string()),
            ("SQS_QUEUE_URL", "http://localhost:4566/queue/uploads".to_string()),
            ("STORAGE_BACKEND", "local".to_string()),
            ("LOCAL_STORAGE_PATH", root),
            ("LOCAL_STORAGE_BASE_URL", "http://localhost:8080/media".to_string()),
        ]);
        let config = Config::from_lookup(|key| env.get(key).cloned()).unwrap();

        let stores = create_bucket_stores(&config).await.unwrap();

        assert_eq!(stores.source.bucket(), "uploads");
        assert_eq!(stores.thumbnails.bucket(), "thumbnails");
        assert_eq!(stores.finals.bucket(), "finals");
        assert_eq!(stores.finals.backend_type(), StorageBackend::Local);
        assert_eq!(
            stores.thumbnails.public_url("thumb_a.jpg"),
            "http://localhost:8080/media/thumbnails/thumb_a.jpg"
        );
        assert!(dir.path().join("uploads").is_dir());
    }
}
