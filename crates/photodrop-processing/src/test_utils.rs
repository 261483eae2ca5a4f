//! Fixture builders shared by the unit tests.

use std::io::Cursor;

use bytes::Bytes;
use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use image::{DynamicImage, ImageFormat, RgbImage};
use img_parts::jpeg::Jpeg;
use img_parts::ImageEXIF;

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }))
}

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    gradient(width, height)
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    buf
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

pub fn gif_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(gradient(width, height).to_rgba8())
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Gif)
        .unwrap();
    buf
}

/// Splice an EXIF block containing `fields` into a JPEG.
pub fn with_exif(jpeg: Vec<u8>, fields: &[Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).unwrap();

    let mut image = Jpeg::from_bytes(Bytes::from(jpeg)).unwrap();
    image.set_exif(Some(Bytes::from(tiff.into_inner())));
    image.encoder().bytes().to_vec()
}

fn rationals(parts: [(u32, u32); 3]) -> Value {
    Value::Rational(parts.iter().map(|&p| Rational::from(p)).collect())
}

fn ascii(value: &str) -> Value {
    Value::Ascii(vec![value.as_bytes().to_vec()])
}

/// The four GPS position tags for a latitude/longitude pair given as rational DMS.
pub fn gps_fields(
    latitude: [(u32, u32); 3],
    latitude_ref: &str,
    longitude: [(u32, u32); 3],
    longitude_ref: &str,
) -> Vec<Field> {
    [
        (Tag::GPSLatitudeRef, ascii(latitude_ref)),
        (Tag::GPSLatitude, rationals(latitude)),
        (Tag::GPSLongitudeRef, ascii(longitude_ref)),
        (Tag::GPSLongitude, rationals(longitude)),
    ]
    .into_iter()
    .map(|(tag, value)| Field {
        tag,
        ifd_num: In::PRIMARY,
        value,
    })
    .collect()
}

/// A JPEG carrying a GPS position, ready to be fed to the pipeline.
pub fn geotagged_jpeg(width: u32, height: u32) -> Vec<u8> {
    with_exif(
        jpeg_bytes(width, height),
        &gps_fields([(40, 1), (0, 1), (0, 1)], "N", [(74, 1), (0, 1), (0, 1)], "W"),
    )
}
