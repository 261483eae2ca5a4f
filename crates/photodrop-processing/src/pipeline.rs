//! Ingest pipeline for one uploaded image.
//!
//! `handle` runs the steps in order: fetch the original into working storage, derive
//! the thumbnail, publish thumbnail and original concurrently, then try to record the
//! image's GPS position. The first three steps are fatal on failure. Geolocation is a
//! separate sub-step whose errors are logged and swallowed unless the configuration
//! asks for persist failures to be escalated.

use std::sync::Arc;
use std::time::Instant;

use photodrop_core::{
    GpsCoordinate, IngestError, LogLevel, PhotoMetadataRecord, PipelineConfig, SourceObject,
};
use photodrop_db::PhotoMetadataStore;
use photodrop_storage::Storage;
use uuid::Uuid;

use crate::gps::extract_gps;
use crate::thumbnail::{derive_thumbnail, Thumbnail};
use crate::workspace::WorkingStorage;

/// What happened to the geolocation sub-step.
#[derive(Debug, Clone, PartialEq)]
pub enum GeotagOutcome {
    /// A metadata record was inserted.
    Recorded {
        record_id: Uuid,
        coordinate: GpsCoordinate,
    },
    /// The image carries no GPS position.
    Absent,
    /// GPS tags could not be used, or the record could not be stored.
    Skipped { error_code: &'static str },
}

/// Result of a successful invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    pub thumbnail_url: String,
    pub final_image_url: String,
    pub geotag: GeotagOutcome,
}

impl IngestOutcome {
    pub fn record_id(&self) -> Option<Uuid> {
        match self.geotag {
            GeotagOutcome::Recorded { record_id, .. } => Some(record_id),
            _ => None,
        }
    }
}

pub struct IngestPipeline {
    config: PipelineConfig,
    source: Arc<dyn Storage>,
    thumbnails: Arc<dyn Storage>,
    finals: Arc<dyn Storage>,
    metadata: Arc<dyn PhotoMetadataStore>,
}

impl IngestPipeline {
    pub fn new(
        config: PipelineConfig,
        source: Arc<dyn Storage>,
        thumbnails: Arc<dyn Storage>,
        finals: Arc<dyn Storage>,
        metadata: Arc<dyn PhotoMetadataStore>,
    ) -> Self {
        Self {
            config,
            source,
            thumbnails,
            finals,
            metadata,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process one uploaded object.
    ///
    /// Working storage is gone by the time this returns, whatever the outcome.
    #[tracing::instrument(
        skip(self, source),
        fields(
            project_id = %self.config.project_id,
            bucket = %source.bucket,
            key = %source.name,
        )
    )]
    pub async fn handle(&self, source: &SourceObject) -> Result<IngestOutcome, IngestError> {
        let start = Instant::now();
        let result = self.run(source).await;
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(outcome) => tracing::info!(
                thumbnail_url = %outcome.thumbnail_url,
                final_image_url = %outcome.final_image_url,
                record_id = ?outcome.record_id(),
                duration_ms = duration_ms,
                "Image ingested"
            ),
            Err(e) => log_error(e, "Image ingest failed"),
        }

        result
    }

    async fn run(&self, source: &SourceObject) -> Result<IngestOutcome, IngestError> {
        if source.bucket != self.source.bucket() {
            return Err(IngestError::UnexpectedBucket {
                bucket: source.bucket.clone(),
                key: source.name.clone(),
                expected: self.source.bucket().to_string(),
            });
        }

        let file_name = source.file_name()?;
        let thumbnail_name = source.thumbnail_name()?;

        let work = WorkingStorage::acquire(&self.config.work_dir, "ingest")
            .await
            .map_err(IngestError::WorkingStorage)?;

        let result = self
            .process(source, &work, &file_name, &thumbnail_name)
            .await;

        if let Err(e) = work.release().await {
            tracing::warn!(error = %e, "Failed to release working storage");
        }

        result
    }

    async fn process(
        &self,
        source: &SourceObject,
        work: &WorkingStorage,
        file_name: &str,
        thumbnail_name: &str,
    ) -> Result<IngestOutcome, IngestError> {
        let original = self
            .source
            .download(&source.name)
            .await
            .map_err(|e| IngestError::Fetch {
                key: source.name.clone(),
                message: e.to_string(),
            })?;
        work.write(file_name, &original).await?;

        let (original, thumbnail) = self.derive(original, thumbnail_name).await?;
        work.write(thumbnail_name, &thumbnail.data).await?;

        let (thumbnail_url, final_image_url) = tokio::try_join!(
            publish(
                self.thumbnails.as_ref(),
                work,
                thumbnail_name,
                thumbnail.content_type()
            ),
            publish(
                self.finals.as_ref(),
                work,
                file_name,
                thumbnail.source_content_type()
            ),
        )?;

        let geotag = match self
            .record_geolocation(&original, &thumbnail_url, &final_image_url)
            .await
        {
            Ok(Some((record_id, coordinate))) => GeotagOutcome::Recorded {
                record_id,
                coordinate,
            },
            Ok(None) => {
                tracing::debug!("No GPS position in image, skipping metadata record");
                GeotagOutcome::Absent
            }
            Err(e @ IngestError::MetadataPersist(_)) if self.config.metadata_persist_required => {
                return Err(e);
            }
            Err(e) => {
                log_error(&e, "Geolocation skipped");
                GeotagOutcome::Skipped {
                    error_code: e.error_code(),
                }
            }
        };

        Ok(IngestOutcome {
            thumbnail_url,
            final_image_url,
            geotag,
        })
    }

    /// Decode and resize on a blocking thread, handing the original bytes back.
    async fn derive(
        &self,
        original: Vec<u8>,
        thumbnail_name: &str,
    ) -> Result<(Vec<u8>, Thumbnail), IngestError> {
        let target = thumbnail_name.to_string();
        let (original, result) = tokio::task::spawn_blocking(move || {
            let result = derive_thumbnail(&original, &target);
            (original, result)
        })
        .await
        .map_err(|e| IngestError::Decode(format!("thumbnail task failed: {}", e)))?;

        let thumbnail = result.map_err(|e| IngestError::Decode(e.to_string()))?;
        tracing::debug!(
            format = ?thumbnail.format,
            size_bytes = thumbnail.data.len(),
            "Thumbnail derived"
        );
        Ok((original, thumbnail))
    }

    /// Best-effort geolocation.
    ///
    /// `Ok(None)` when the image has no GPS position. Unusable tags yield
    /// `MetadataExtraction`; a failed insert yields `MetadataPersist`.
    async fn record_geolocation(
        &self,
        original: &[u8],
        thumbnail_url: &str,
        final_image_url: &str,
    ) -> Result<Option<(Uuid, GpsCoordinate)>, IngestError> {
        let coordinate = match extract_gps(original) {
            Ok(Some(coordinate)) => coordinate,
            Ok(None) => return Ok(None),
            Err(e) => return Err(IngestError::MetadataExtraction(e.to_string())),
        };

        let record = PhotoMetadataRecord::new(thumbnail_url, final_image_url, coordinate);
        let record_id = self.metadata.insert(&record).await.map_err(|e| match e {
            IngestError::MetadataPersist(_) => e,
            other => IngestError::MetadataPersist(other.to_string()),
        })?;

        tracing::info!(
            record_id = %record_id,
            latitude = coordinate.latitude,
            longitude = coordinate.longitude,
            "Photo metadata recorded"
        );
        Ok(Some((record_id, coordinate)))
    }
}

/// Upload a file from working storage under the same name.
async fn publish(
    store: &dyn Storage,
    work: &WorkingStorage,
    name: &str,
    content_type: &str,
) -> Result<String, IngestError> {
    let data = work.read(name).await?;
    store
        .upload_with_key(name, data, content_type)
        .await
        .map_err(|e| IngestError::Publish {
            key: format!("{}/{}", store.bucket(), name),
            message: e.to_string(),
        })
}

fn log_error(error: &IngestError, message: &str) {
    let error_code = error.error_code();
    let recoverable = error.is_recoverable();
    match error.log_level() {
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_code, recoverable, "{}", message);
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_code, recoverable, "{}", message);
        }
    }
}
