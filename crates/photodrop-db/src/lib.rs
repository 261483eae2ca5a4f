//! Photodrop metadata store
//!
//! The pipeline only ever appends photo metadata documents. The [`PhotoMetadataStore`]
//! trait is the seam the pipeline depends on; [`PhotoMetadataRepository`] is the
//! PostgreSQL implementation used in production.

pub mod photo;
pub mod pool;

pub use photo::{PhotoMetadataRepository, PhotoMetadataStore};
pub use pool::{connect, run_migrations};
