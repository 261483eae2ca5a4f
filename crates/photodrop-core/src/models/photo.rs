//! Geolocation and photo metadata models.

use serde::{Deserialize, Serialize};

/// A position in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Document persisted for every photo whose GPS tags could be read.
///
/// Serialized with the camelCase field names consumers of the collection expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoMetadataRecord {
    pub thumbnail_url: String,
    pub final_image_url: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl PhotoMetadataRecord {
    pub fn new(
        thumbnail_url: impl Into<String>,
        final_image_url: impl Into<String>,
        coordinate: GpsCoordinate,
    ) -> Self {
        Self {
            thumbnail_url: thumbnail_url.into(),
            final_image_url: final_image_url.into(),
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        }
    }

    pub fn coordinate(&self) -> GpsCoordinate {
        GpsCoordinate::new(self.latitude, self.longitude)
    }
}
