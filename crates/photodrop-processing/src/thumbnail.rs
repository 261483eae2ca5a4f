//! Fixed-size thumbnail derivation.

use std::io::Cursor;
use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader, ImageResult};
use photodrop_core::constants::{THUMBNAIL_HEIGHT, THUMBNAIL_WIDTH};

/// Formats a thumbnail can be written in.
const OUTPUT_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// An encoded thumbnail ready to be published.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub data: Vec<u8>,
    pub format: ImageFormat,
    /// Format detected in the source bytes, if any.
    pub source_format: Option<ImageFormat>,
}

impl Thumbnail {
    pub fn content_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// Content type of the original the thumbnail was derived from.
    pub fn source_content_type(&self) -> &'static str {
        self.source_format
            .map(|f| f.to_mime_type())
            .unwrap_or("application/octet-stream")
    }
}

/// Decode `data` and scale it to exactly 64×64, ignoring the aspect ratio.
///
/// The output format follows the extension of `target_name`, then the detected source
/// format, then PNG. CPU bound; call from a blocking thread.
pub fn derive_thumbnail(data: &[u8], target_name: &str) -> ImageResult<Thumbnail> {
    let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    let source_format = reader.format();
    let img = reader.decode()?;

    let resized = img.resize_exact(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT, FilterType::Triangle);
    let format = output_format(target_name, source_format);

    let mut data = Vec::new();
    encodable(resized, format).write_to(&mut Cursor::new(&mut data), format)?;

    Ok(Thumbnail {
        data,
        format,
        source_format,
    })
}

fn output_format(target_name: &str, source_format: Option<ImageFormat>) -> ImageFormat {
    ImageFormat::from_path(Path::new(target_name))
        .ok()
        .filter(|f| OUTPUT_FORMATS.contains(f))
        .or(source_format.filter(|f| OUTPUT_FORMATS.contains(f)))
        .unwrap_or(ImageFormat::Png)
}

/// Convert to a pixel layout the chosen encoder accepts.
fn encodable(img: DynamicImage, format: ImageFormat) -> DynamicImage {
    match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
        ImageFormat::Gif | ImageFormat::WebP => DynamicImage::ImageRgba8(img.to_rgba8()),
        _ => img,
    }
}
