//! Ingest handler trait
//!
//! The consumer only knows how to turn queue messages into [`SourceObject`]s; what
//! happens to each object is behind this trait. [`IngestPipeline`] is the production
//! implementation.

use async_trait::async_trait;
use photodrop_core::{IngestError, SourceObject};
use photodrop_processing::IngestPipeline;

/// Handles one uploaded object.
#[async_trait]
pub trait IngestHandler: Send + Sync {
    /// Name of the bucket this handler ingests from.
    fn source_bucket(&self) -> &str;

    /// Process the object. An error means the triggering message should be redelivered.
    async fn handle_object(&self, object: &SourceObject) -> Result<(), IngestError>;
}

#[async_trait]
impl IngestHandler for IngestPipeline {
    fn source_bucket(&self) -> &str {
        &self.config().source_bucket
    }

    async fn handle_object(&self, object: &SourceObject) -> Result<(), IngestError> {
        self.handle(object).await.map(|_| ())
    }
}
