//! GPS extraction from EXIF and conversion to decimal degrees.

mod convert;
mod exif_tags;

pub use self::convert::{to_decimal, to_gps_coordinate, Dms};
pub use self::exif_tags::extract_gps;

/// Errors raised while reading or converting GPS tags.
#[derive(Debug, thiserror::Error)]
pub enum GpsError {
    #[error("EXIF data could not be read: {0}")]
    Exif(#[from] exif::Error),

    #[error("GPS position is incomplete: latitude, longitude and both references are required")]
    Incomplete,

    #[error("GPS tag {tag} has an invalid value: {reason}")]
    InvalidValue { tag: &'static str, reason: String },

    #[error("GPS {axis} component is not a finite number")]
    NonFinite { axis: &'static str },
}
