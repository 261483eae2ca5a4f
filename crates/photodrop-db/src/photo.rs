//! Photo metadata repository: append-only inserts into the photos table.

use async_trait::async_trait;
use photodrop_core::{IngestError, PhotoMetadataRecord};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Append-only collection of photo metadata documents.
#[async_trait]
pub trait PhotoMetadataStore: Send + Sync {
    /// Insert a new document and return its server-assigned id.
    async fn insert(&self, record: &PhotoMetadataRecord) -> Result<Uuid, IngestError>;
}

/// Repository for the photos table.
#[derive(Clone)]
pub struct PhotoMetadataRepository {
    pool: PgPool,
}

impl PhotoMetadataRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PhotoMetadataStore for PhotoMetadataRepository {
    #[tracing::instrument(skip(self, record), fields(db.table = "photos"))]
    async fn insert(&self, record: &PhotoMetadataRecord) -> Result<Uuid, IngestError> {
        let id: Uuid = sqlx::query_scalar::<Postgres, Uuid>(
            r#"
            INSERT INTO photos (thumbnail_url, final_image_url, latitude, longitude)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&record.thumbnail_url)
        .bind(&record.final_image_url)
        .bind(record.latitude)
        .bind(record.longitude)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| IngestError::MetadataPersist(e.to_string()))?;

        tracing::debug!(record_id = %id, "Photo metadata inserted");
        Ok(id)
    }
}
