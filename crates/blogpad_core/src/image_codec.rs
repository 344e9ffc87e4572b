//! Post image compression.
//!
//! # Responsibility
//! - Decode an uploaded raster image, honoring its EXIF orientation.
//! - Shrink it to fit an 800x800 box while keeping its aspect ratio.
//! - Re-encode as JPEG (quality 80) and wrap it in a `data:` URI.
//!
//! # Invariants
//! - One scale factor is applied to both dimensions.
//! - Images already inside the box are never upscaled.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageError, ImageReader};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Cursor;
use std::time::Instant;

/// Longest edge allowed after compression.
pub const MAX_EDGE_PX: u32 = 800;
/// JPEG quality, 0.8 on the usual 0..1 scale.
pub const JPEG_QUALITY: u8 = 80;
const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

#[derive(Debug)]
pub enum ImageCodecError {
    /// Input bytes are not a decodable raster image.
    Decode(ImageError),
    /// Re-encoding the resized pixels failed.
    Encode(ImageError),
}

impl Display for ImageCodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decode(err) => write!(f, "image decode failed: {err}"),
            Self::Encode(err) => write!(f, "image encode failed: {err}"),
        }
    }
}

impl Error for ImageCodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Decode(err) | Self::Encode(err) => Some(err),
        }
    }
}

/// Computes output dimensions for a `width x height` source.
///
/// The longer edge is clamped to [`MAX_EDGE_PX`]; the other edge is scaled by
/// the same factor and truncated. Square images follow the height branch.
pub fn fit_dimensions(width: u32, height: u32) -> (u32, u32) {
    let max = u64::from(MAX_EDGE_PX);
    if width > height {
        if width > MAX_EDGE_PX {
            let scaled = u64::from(height) * max / u64::from(width);
            return (MAX_EDGE_PX, scaled.max(1) as u32);
        }
    } else if height > MAX_EDGE_PX {
        let scaled = u64::from(width) * max / u64::from(height);
        return (scaled.max(1) as u32, MAX_EDGE_PX);
    }
    (width, height)
}

/// Decodes `bytes` and applies any EXIF orientation, so dimensions are the
/// ones a viewer displays rather than the stored sensor frame.
fn decode_upright(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);
    Ok(image)
}

/// Compresses raw image bytes into a JPEG `data:` URI.
///
/// # Errors
/// - `ImageCodecError::Decode` when `bytes` is not a supported image.
/// - `ImageCodecError::Encode` when JPEG encoding fails.
pub fn compress_image(bytes: &[u8]) -> Result<String, ImageCodecError> {
    let started_at = Instant::now();
    let decoded = decode_upright(bytes).map_err(|err| {
        error!(
            "event=image_compress module=image_codec status=error error_code=decode_failed input_bytes={}",
            bytes.len()
        );
        ImageCodecError::Decode(err)
    })?;

    let (width, height) = fit_dimensions(decoded.width(), decoded.height());
    let resized = if (width, height) == (decoded.width(), decoded.height()) {
        decoded
    } else {
        decoded.resize_exact(width, height, FilterType::Triangle)
    };

    // JPEG has no alpha channel; transparent pixels flatten to their color.
    let rgb = resized.to_rgb8();
    let mut encoded = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY))
        .map_err(ImageCodecError::Encode)?;

    info!(
        "event=image_compress module=image_codec status=ok width={} height={} input_bytes={} output_bytes={} duration_ms={}",
        width,
        height,
        bytes.len(),
        encoded.len(),
        started_at.elapsed().as_millis()
    );

    let mut uri = String::with_capacity(DATA_URI_PREFIX.len() + encoded.len() * 4 / 3 + 4);
    uri.push_str(DATA_URI_PREFIX);
    STANDARD.encode_string(&encoded, &mut uri);
    Ok(uri)
}

#[cfg(test)]
mod tests {
    use super::{compress_image, fit_dimensions, ImageCodecError};

    #[test]
    fn landscape_is_clamped_on_width() {
        assert_eq!(fit_dimensions(1600, 800), (800, 400));
        assert_eq!(fit_dimensions(1000, 333), (800, 266));
    }

    #[test]
    fn portrait_and_square_are_clamped_on_height() {
        assert_eq!(fit_dimensions(600, 1200), (400, 800));
        assert_eq!(fit_dimensions(1000, 1000), (800, 800));
    }

    #[test]
    fn small_images_are_not_upscaled() {
        assert_eq!(fit_dimensions(400, 300), (400, 300));
        assert_eq!(fit_dimensions(800, 800), (800, 800));
    }

    #[test]
    fn extreme_aspect_keeps_at_least_one_pixel() {
        assert_eq!(fit_dimensions(4000, 1), (800, 1));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = compress_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ImageCodecError::Decode(_)));
    }
}
