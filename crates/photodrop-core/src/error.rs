//! Error types module
//!
//! Every failure an ingest invocation can hit is represented by [`IngestError`].
//! `MetadataExtraction` and `MetadataPersist` come from the best-effort geolocation
//! sub-step and are normally logged and swallowed by the pipeline. Any error that does
//! escape an invocation is retried only if [`IngestError::is_recoverable`] says a
//! redelivery could succeed.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Warning level - for recoverable issues that do not fail the invocation
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Invalid object name: {0}")]
    InvalidObjectName(String),

    #[error("Object {key} is in bucket {bucket}, expected {expected}")]
    UnexpectedBucket {
        bucket: String,
        key: String,
        expected: String,
    },

    #[error("Working storage error: {0}")]
    WorkingStorage(#[source] io::Error),

    #[error("Failed to fetch {key}: {message}")]
    Fetch { key: String, message: String },

    #[error("Image decode failed: {0}")]
    Decode(String),

    #[error("Failed to publish {key}: {message}")]
    Publish { key: String, message: String },

    #[error("Metadata extraction failed: {0}")]
    MetadataExtraction(String),

    #[error("Metadata persist failed: {0}")]
    MetadataPersist(String),
}

impl IngestError {
    /// Machine-readable error code, used as a structured log field.
    pub fn error_code(&self) -> &'static str {
        match self {
            IngestError::InvalidObjectName(_) => "INVALID_OBJECT_NAME",
            IngestError::UnexpectedBucket { .. } => "UNEXPECTED_BUCKET",
            IngestError::WorkingStorage(_) => "WORKING_STORAGE_ERROR",
            IngestError::Fetch { .. } => "FETCH_FAILURE",
            IngestError::Decode(_) => "DECODE_FAILURE",
            IngestError::Publish { .. } => "PUBLISH_FAILURE",
            IngestError::MetadataExtraction(_) => "METADATA_EXTRACTION_FAILURE",
            IngestError::MetadataPersist(_) => "METADATA_PERSIST_FAILURE",
        }
    }

    /// Whether redelivering the same trigger could succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            IngestError::WorkingStorage(_)
                | IngestError::Fetch { .. }
                | IngestError::Publish { .. }
                | IngestError::MetadataPersist(_)
        )
    }

    pub fn log_level(&self) -> LogLevel {
        match self {
            IngestError::InvalidObjectName(_) | IngestError::UnexpectedBucket { .. } => {
                LogLevel::Warn
            }
            IngestError::Decode(_) => LogLevel::Warn,
            IngestError::MetadataExtraction(_) => LogLevel::Warn,
            IngestError::WorkingStorage(_)
            | IngestError::Fetch { .. }
            | IngestError::Publish { .. }
            | IngestError::MetadataPersist(_) => LogLevel::Error,
        }
    }
}

impl From<io::Error> for IngestError {
    fn from(err: io::Error) -> Self {
        IngestError::WorkingStorage(err)
    }
}
