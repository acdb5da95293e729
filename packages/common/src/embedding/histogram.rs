use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageFormat};

use super::error::ExtractionError;
use super::{BINS_PER_CHANNEL, CANONICAL_SIZE, FEATURE_DIM};

/// 256 intensity levels spread over `BINS_PER_CHANNEL` bins.
const BIN_WIDTH: u8 = (256 / BINS_PER_CHANNEL) as u8;

/// Everything a single decode of an uploaded image yields.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFeatures {
    pub width: u32,
    pub height: u32,
    /// Upper-case container name such as `PNG` or `JPEG`.
    pub format: Option<String>,
    pub vector: Vec<f32>,
}

/// Decode `bytes` once and return pixel dimensions, container format and the
/// histogram signature.
pub fn analyze(bytes: &[u8]) -> Result<ImageFeatures, ExtractionError> {
    let format = image::guess_format(bytes).ok().map(format_name);
    let image = image::load_from_memory(bytes)?;
    let (width, height) = image.dimensions();

    Ok(ImageFeatures {
        width,
        height,
        format,
        vector: histogram(&image),
    })
}

/// Compute the normalized colour-histogram signature of encoded image bytes.
pub fn extract_features(bytes: &[u8]) -> Result<Vec<f32>, ExtractionError> {
    let image = image::load_from_memory(bytes)?;
    Ok(histogram(&image))
}

/// Normalized RGB histogram of an already decoded image.
///
/// The result always has `FEATURE_DIM` entries. It sums to 1 unless the image
/// carries no signal at all (no pixels, or every channel of every pixel is 0),
/// in which case it is all zeros.
pub fn histogram(image: &DynamicImage) -> Vec<f32> {
    let rgb = image.to_rgb8();
    if rgb.width() == 0 || rgb.height() == 0 {
        return vec![0.0; FEATURE_DIM];
    }

    let resized = imageops::resize(&rgb, CANONICAL_SIZE, CANONICAL_SIZE, FilterType::Triangle);

    let mut counts = [0u32; FEATURE_DIM];
    let mut lit = false;
    for pixel in resized.pixels() {
        for (channel, &value) in pixel.0.iter().enumerate() {
            counts[channel * BINS_PER_CHANNEL + usize::from(value / BIN_WIDTH)] += 1;
            lit |= value != 0;
        }
    }

    let total: u32 = counts.iter().sum();
    if !lit || total == 0 {
        return vec![0.0; FEATURE_DIM];
    }

    counts
        .iter()
        .map(|&count| count as f32 / total as f32)
        .collect()
}

fn format_name(format: ImageFormat) -> String {
    format!("{format:?}").to_uppercase()
}
