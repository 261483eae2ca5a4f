//! Photodrop Storage Library
//!
//! Storage abstraction over the three buckets the pipeline touches (the upload source,
//! the thumbnail archive and the final archive), with S3 and local filesystem backends.
//!
//! # Storage key format
//!
//! Keys are used verbatim within a bucket. They must not contain `..` or start with
//! `/`; validation is centralized in the `keys` module so all backends agree.
//!
//! # Public URLs
//!
//! Archived objects are addressed as `https://<host>/<bucket>/<key>`, each key segment
//! percent-encoded (see [`join_url`]).

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_bucket_stores, create_storage, BucketStores};
pub use keys::join_url;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use photodrop_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
