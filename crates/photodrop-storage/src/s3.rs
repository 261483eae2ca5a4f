use crate::keys::{join_url, validate_key};
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::time::Instant;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectStoreExt, PutOptions, PutPayload, Result as ObjectResult,
};

/// One S3 bucket, accessed through `object_store`.
///
/// Works against AWS and against S3-compatible servers (MinIO, LocalStack) when an
/// endpoint is given.
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>,
    public_host: Option<String>,
}

impl S3Storage {
    /// Credentials come from the usual AWS environment variables.
    ///
    /// `public_host` overrides the host used in returned URLs, e.g. a CDN in front of
    /// the bucket.
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        public_host: Option<String>,
    ) -> StorageResult<Self> {
        let builder = AmazonS3Builder::from_env()
            .with_region(&region)
            .with_bucket_name(&bucket);
        let builder = match endpoint_url.as_deref() {
            Some(endpoint) => builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://")),
            None => builder,
        };

        let store = builder.build().map_err(|e| {
            StorageError::ConfigError(format!("S3 bucket {}: {}", bucket, e))
        })?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
            public_host,
        })
    }
}

/// Object path for a validated key.
///
/// The key is used verbatim: characters such as `%` or `[` are not re-encoded, and
/// empty or `.` segments are an `InvalidKey` error.
fn object_path(storage_key: &str) -> StorageResult<Path> {
    validate_key(storage_key)?;
    Path::parse(storage_key)
        .map_err(|e| StorageError::InvalidKey(format!("{}: {}", storage_key, e)))
}

/// Path-style public URL for an object.
///
/// Order of precedence: explicit public host, custom endpoint, regional AWS host.
fn public_url_for(
    bucket: &str,
    region: &str,
    endpoint_url: Option<&str>,
    public_host: Option<&str>,
    key: &str,
) -> String {
    if let Some(host) = public_host {
        let host = host
            .trim_start_matches("https://")
            .trim_start_matches("http://");
        join_url(&format!("https://{}", host), bucket, key)
    } else if let Some(endpoint) = endpoint_url {
        join_url(endpoint, bucket, key)
    } else {
        join_url(&format!("https://s3.{}.amazonaws.com", region), bucket, key)
    }
}

#[async_trait]
impl Storage for S3Storage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }

    fn public_url(&self, storage_key: &str) -> String {
        public_url_for(
            &self.bucket,
            &self.region,
            self.endpoint_url.as_deref(),
            self.public_host.as_deref(),
            storage_key,
        )
    }

    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        let location = object_path(storage_key)?;
        let size = data.len() as u64;
        let start = Instant::now();

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        let result: ObjectResult<_> = object_store::ObjectStore::put_opts(
            &self.store,
            &location,
            PutPayload::from(Bytes::from(data)),
            opts,
        )
        .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        let url = self.public_url(storage_key);

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(url)
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let location = object_path(storage_key)?;
        let start = Instant::now();

        let fetched: ObjectResult<_> = self.store.get(&location).await;
        let fetched = fetched.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(storage_key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let bytes = fetched
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(bytes.to_vec())
    }
}
