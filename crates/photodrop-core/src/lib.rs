//! Photodrop Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration and constants
//! shared by every Photodrop component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, PipelineConfig};
pub use error::{IngestError, LogLevel};
pub use models::{GpsCoordinate, PhotoMetadataRecord, SourceObject};
pub use storage_types::StorageBackend;
