//! Photodrop Processing Library
//!
//! Everything that happens to one uploaded image: thumbnail derivation, GPS extraction
//! and coordinate conversion, invocation-scoped scratch space, and the
//! [`IngestPipeline`] that strings them together.

pub mod gps;
pub mod thumbnail;
pub mod pipeline;
pub mod workspace;

#[cfg(test)]
pub(crate) mod test_utils;

pub use gps::{extract_gps, Dms, GpsError};
pub use pipeline::{GeotagOutcome, IngestOutcome, IngestPipeline};
pub use thumbnail::{derive_thumbnail, Thumbnail};
pub use workspace::WorkingStorage;
