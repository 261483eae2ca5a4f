use std::io::Cursor;

use exif::{Field, In, Tag, Value};
use image::ImageFormat;
use photodrop_core::GpsCoordinate;

use super::convert::{to_gps_coordinate, Dms};
use super::GpsError;

/// Containers EXIF is read from. Anything else recognised by `image` carries no tags.
const EXIF_CONTAINERS: [ImageFormat; 5] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Tiff,
    ImageFormat::WebP,
    ImageFormat::Avif,
];

/// Read the GPS position from an image's EXIF block.
///
/// Returns `Ok(None)` when the image carries no EXIF data or no GPS position tags,
/// including formats such as GIF that have no EXIF block at all. Tags that are present
/// but unusable are an error.
pub fn extract_gps(data: &[u8]) -> Result<Option<GpsCoordinate>, GpsError> {
    if let Ok(format) = image::guess_format(data) {
        if !EXIF_CONTAINERS.contains(&format) {
            return Ok(None);
        }
    }

    let mut cursor = Cursor::new(data);
    let exif = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let latitude = exif.get_field(Tag::GPSLatitude, In::PRIMARY);
    let latitude_ref = exif.get_field(Tag::GPSLatitudeRef, In::PRIMARY);
    let longitude = exif.get_field(Tag::GPSLongitude, In::PRIMARY);
    let longitude_ref = exif.get_field(Tag::GPSLongitudeRef, In::PRIMARY);

    match (latitude, latitude_ref, longitude, longitude_ref) {
        (None, None, None, None) => Ok(None),
        (Some(lat), Some(lat_ref), Some(lon), Some(lon_ref)) => {
            let coordinate = to_gps_coordinate(
                read_dms(lat, "GPSLatitude")?,
                &read_reference(lat_ref, "GPSLatitudeRef")?,
                read_dms(lon, "GPSLongitude")?,
                &read_reference(lon_ref, "GPSLongitudeRef")?,
            )?;
            Ok(Some(coordinate))
        }
        _ => Err(GpsError::Incomplete),
    }
}

fn read_dms(field: &Field, tag: &'static str) -> Result<Dms, GpsError> {
    let components: Vec<f64> = match &field.value {
        Value::Rational(values) => values.iter().map(|r| r.to_f64()).collect(),
        Value::SRational(values) => values.iter().map(|r| r.to_f64()).collect(),
        other => {
            return Err(GpsError::InvalidValue {
                tag,
                reason: format!("expected rational components, found {:?}", other),
            })
        }
    };

    match components.as_slice() {
        [degrees, minutes, seconds] => Ok(Dms::new(*degrees, *minutes, *seconds)),
        _ => Err(GpsError::InvalidValue {
            tag,
            reason: format!("expected 3 components, found {}", components.len()),
        }),
    }
}

fn read_reference(field: &Field, tag: &'static str) -> Result<String, GpsError> {
    match &field.value {
        Value::Ascii(values) => Ok(values
            .first()
            .map(|v| String::from_utf8_lossy(v).trim().to_string())
            .unwrap_or_default()),
        other => Err(GpsError::InvalidValue {
            tag,
            reason: format!("expected ASCII reference, found {:?}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{gif_bytes, gps_fields, jpeg_bytes, png_bytes, with_exif};
    use exif::Rational;

    #[test]
    fn test_image_without_exif() {
        assert_eq!(extract_gps(&jpeg_bytes(16, 16)).unwrap(), None);
        assert_eq!(extract_gps(&png_bytes(16, 16)).unwrap(), None);
    }

    #[test]
    fn test_format_without_exif_support() {
        assert_eq!(extract_gps(&gif_bytes(16, 16)).unwrap(), None);
    }

    #[test]
    fn test_exif_without_gps() {
        let fields = vec![Field {
            tag: Tag::Make,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![b"Photodrop".to_vec()]),
        }];
        let data = with_exif(jpeg_bytes(16, 16), &fields);
        assert_eq!(extract_gps(&data).unwrap(), None);
    }

    #[test]
    fn test_reads_gps_position() {
        let fields = gps_fields([(51, 1), (30, 1), (0, 1)], "N", [(0, 1), (7, 1), (0, 1)], "W");
        let data = with_exif(jpeg_bytes(32, 16), &fields);

        let coordinate = extract_gps(&data).unwrap().unwrap();
        assert!((coordinate.latitude - 51.5).abs() < 1e-9);
        assert!((coordinate.longitude + 7.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_fractional_seconds() {
        let fields = gps_fields(
            [(40, 1), (26, 1), (4632, 100)],
            "N",
            [(79, 1), (58, 1), (5600, 100)],
            "W",
        );
        let data = with_exif(jpeg_bytes(16, 16), &fields);

        let coordinate = extract_gps(&data).unwrap().unwrap();
        assert!((coordinate.latitude - (40.0 + 26.0 / 60.0 + 46.32 / 3600.0)).abs() < 1e-9);
        assert!((coordinate.longitude + (79.0 + 58.0 / 60.0 + 56.0 / 3600.0)).abs() < 1e-9);
    }

    #[test]
    fn test_partial_position_is_an_error() {
        let fields = vec![
            Field {
                tag: Tag::GPSLatitudeRef,
                ifd_num: In::PRIMARY,
                value: Value::Ascii(vec![b"N".to_vec()]),
            },
            Field {
                tag: Tag::GPSLatitude,
                ifd_num: In::PRIMARY,
                value: Value::Rational(vec![
                    Rational::from((40, 1)),
                    Rational::from((0, 1)),
                    Rational::from((0, 1)),
                ]),
            },
        ];
        let data = with_exif(jpeg_bytes(16, 16), &fields);
        assert!(matches!(extract_gps(&data), Err(GpsError::Incomplete)));
    }

    #[test]
    fn test_non_numeric_component_is_an_error() {
        let mut fields = gps_fields([(40, 1), (0, 1), (0, 1)], "N", [(74, 1), (0, 1), (0, 1)], "W");
        for field in fields.iter_mut() {
            if field.tag == Tag::GPSLatitude {
                field.value = Value::Ascii(vec![b"forty".to_vec()]);
            }
        }
        let data = with_exif(jpeg_bytes(16, 16), &fields);
        assert!(matches!(
            extract_gps(&data),
            Err(GpsError::InvalidValue {
                tag: "GPSLatitude",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_denominator_is_an_error() {
        let fields = gps_fields([(40, 1), (0, 0), (0, 1)], "N", [(74, 1), (0, 1), (0, 1)], "W");
        let data = with_exif(jpeg_bytes(16, 16), &fields);
        assert!(matches!(
            extract_gps(&data),
            Err(GpsError::NonFinite { axis: "latitude" })
        ));
    }

    #[test]
    fn test_wrong_component_count_is_an_error() {
        let mut fields = gps_fields([(40, 1), (0, 1), (0, 1)], "N", [(74, 1), (0, 1), (0, 1)], "W");
        for field in fields.iter_mut() {
            if field.tag == Tag::GPSLongitude {
                field.value = Value::Rational(vec![Rational::from((74, 1)), Rational::from((0, 1))]);
            }
        }
        let data = with_exif(jpeg_bytes(16, 16), &fields);
        assert!(matches!(
            extract_gps(&data),
            Err(GpsError::InvalidValue {
                tag: "GPSLongitude",
                ..
            })
        ));
    }
}
