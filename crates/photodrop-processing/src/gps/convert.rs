use photodrop_core::GpsCoordinate;

use super::GpsError;

/// An angle in degrees, minutes and seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dms {
    pub degrees: f64,
    pub minutes: f64,
    pub seconds: f64,
}

impl Dms {
    pub fn new(degrees: f64, minutes: f64, seconds: f64) -> Self {
        Self {
            degrees,
            minutes,
            seconds,
        }
    }
}

/// Convert one axis to signed decimal degrees.
///
/// The value is negative when `reference` starts with `S` or `W` (case-insensitive)
/// and positive for anything else. Ranges are not checked.
pub fn to_decimal(dms: Dms, reference: &str, axis: &'static str) -> Result<f64, GpsError> {
    if ![dms.degrees, dms.minutes, dms.seconds]
        .iter()
        .all(|component| component.is_finite())
    {
        return Err(GpsError::NonFinite { axis });
    }

    let magnitude = dms.degrees + dms.minutes / 60.0 + dms.seconds / 3600.0;
    let negative = matches!(
        reference.trim().chars().next().map(|c| c.to_ascii_uppercase()),
        Some('S') | Some('W')
    );

    Ok(if negative { -magnitude } else { magnitude })
}

/// Convert latitude and longitude independently and pair them.
pub fn to_gps_coordinate(
    latitude: Dms,
    latitude_ref: &str,
    longitude: Dms,
    longitude_ref: &str,
) -> Result<GpsCoordinate, GpsError> {
    Ok(GpsCoordinate::new(
        to_decimal(latitude, latitude_ref, "latitude")?,
        to_decimal(longitude, longitude_ref, "longitude")?,
    ))
}
