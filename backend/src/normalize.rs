use std::env;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use thiserror::Error;

pub const DEFAULT_MAX_DIMENSION: u32 = 1024;
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("unsupported media type: {0}")]
    UnsupportedMedia(String),
    #[error("image decoding failed: {0}")]
    Decode(#[source] image::ImageError),
    #[error("image encoding failed: {0}")]
    Encode(#[source] image::ImageError),
}

/// Rotation to apply before encoding, derived from the device orientation the
/// client reported at capture time. Values mirror `window.orientation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureRotation {
    #[default]
    None,
    /// Landscape-primary capture (+90).
    CounterClockwise,
    /// Landscape-secondary capture (-90).
    Clockwise,
}

impl CaptureRotation {
    pub fn from_field(value: &str) -> Self {
        match value.trim() {
            "90" => CaptureRotation::CounterClockwise,
            "-90" => CaptureRotation::Clockwise,
            _ => CaptureRotation::None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// Maximum length of the longer image side, in pixels.
    pub max_dimension: u32,
    /// JPEG quality factor, 0-100.
    pub jpeg_quality: u8,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl NormalizeConfig {
    pub fn from_env() -> Self {
        Self {
            max_dimension: env::var("MAX_IMAGE_DIMENSION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_DIMENSION),
            jpeg_quality: env::var("JPEG_QUALITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_JPEG_QUALITY),
        }
    }
}

/// A bounded-size JPEG payload ready for upload to the classifier.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Turns arbitrary input bytes into a bounded JPEG payload: rejects non-image
/// MIME types, applies the capture rotation, scales the longer side down to
/// the configured maximum (never up), and re-encodes at fixed quality.
pub fn normalize(
    bytes: &[u8],
    declared_mime: &str,
    rotation: CaptureRotation,
    config: &NormalizeConfig,
) -> Result<ImagePayload, NormalizeError> {
    if !declared_mime.starts_with("image/") {
        return Err(NormalizeError::UnsupportedMedia(declared_mime.to_string()));
    }

    let img = image::load_from_memory(bytes).map_err(NormalizeError::Decode)?;
    let img = match rotation {
        CaptureRotation::None => img,
        CaptureRotation::Clockwise => img.rotate90(),
        CaptureRotation::CounterClockwise => img.rotate270(),
    };
    let img = scale_down(img, config.max_dimension);

    // JPEG has no alpha channel; flatten before encoding.
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, config.jpeg_quality)
        .encode_image(&rgb)
        .map_err(NormalizeError::Encode)?;

    Ok(ImagePayload {
        bytes: out,
        mime: "image/jpeg",
        width,
        height,
    })
}

fn scale_down(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= max_dimension && height <= max_dimension {
        return img;
    }

    let (new_width, new_height) = if width > height {
        let scaled = (height as f64 * max_dimension as f64 / width as f64).round() as u32;
        (max_dimension, scaled.max(1))
    } else {
        let scaled = (width as f64 * max_dimension as f64 / height as f64).round() as u32;
        (scaled.max(1), max_dimension)
    };

    img.resize_exact(new_width, new_height, FilterType::CatmullRom)
}
