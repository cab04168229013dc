//! Image loading and luminance derivation for feature extraction.
//!
//! Accepts a file path, raw bytes, or base64 text (as produced by browser
//! upload forms) and decodes once into an owned RGB buffer.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{GrayImage, Luma, RgbImage};
use tracing::debug;

use crate::error::AnalysisError;

/// File extensions accepted when scanning directories for leaf photos.
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Where an image to analyze comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
    /// Base64 text, optionally wrapped as a `data:image/...;base64,` URL
    Base64(String),
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Bytes(bytes)
    }
}

/// Decode an image source into an RGB pixel grid with at least one pixel.
pub fn load_image(source: &ImageSource) -> Result<RgbImage, AnalysisError> {
    let rgb = match source {
        ImageSource::Path(path) => {
            let bytes = std::fs::read(path).map_err(|e| AnalysisError::Io {
                path: path.clone(),
                source: e,
            })?;
            decode_bytes(&bytes)?
        }
        ImageSource::Bytes(bytes) => decode_bytes(bytes)?,
        ImageSource::Base64(text) => decode_base64(text)?,
    };

    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(AnalysisError::EmptyImage);
    }

    debug!("Loaded image: {}x{}", rgb.width(), rgb.height());
    Ok(rgb)
}

/// Decode raw encoded bytes (any format the `image` crate can guess).
pub fn decode_bytes(bytes: &[u8]) -> Result<RgbImage, AnalysisError> {
    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgb8())
}

/// Decode base64 text, stripping a data-URL prefix when present.
fn decode_base64(text: &str) -> Result<RgbImage, AnalysisError> {
    let payload = match text.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => text,
    };
    let bytes = STANDARD.decode(payload.trim())?;
    decode_bytes(&bytes)
}

/// Single-channel luminance of an RGB image, as a new buffer.
///
/// ITU-R BT.601 weights (0.299, 0.587, 0.114) in 16-bit fixed point with
/// rounding, the same integer result PIL's `convert("L")` gives.
/// `imageops::grayscale` uses BT.709 weights instead and rates green
/// foliage noticeably brighter.
pub fn luminance(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        let l = (r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16;
        Luma([l as u8])
    })
}

/// Mean and population variance of all luminance samples.
pub fn luminance_stats(gray: &GrayImage) -> (f64, f64) {
    let total = gray.as_raw().len();
    if total == 0 {
        return (0.0, 0.0);
    }
    let n = total as f64;
    let mean = gray.as_raw().iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = gray
        .as_raw()
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    (mean, variance)
}

/// Whether a path has one of the supported image extensions.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb};
    use std::io::Cursor;

    fn png_bytes(img: RgbImage) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_load_image_rejects_invalid() {
        let result = load_image(&ImageSource::Bytes(b"not an image".to_vec()));
        assert!(matches!(result, Err(AnalysisError::Decode(_))));
    }

    #[test]
    fn test_load_image_missing_file() {
        let result = load_image(&ImageSource::Path(PathBuf::from("/no/such/leaf.png")));
        assert!(matches!(result, Err(AnalysisError::Io { .. })));
    }

    #[test]
    fn test_load_image_valid_png() {
        let bytes = png_bytes(RgbImage::from_pixel(20, 10, Rgb([50, 180, 50])));
        let rgb = load_image(&ImageSource::Bytes(bytes)).unwrap();
        assert_eq!(rgb.dimensions(), (20, 10));
        assert_eq!(rgb.get_pixel(3, 3), &Rgb([50, 180, 50]));
    }

    #[test]
    fn test_load_image_base64_and_data_url() {
        let bytes = png_bytes(RgbImage::from_pixel(4, 4, Rgb([10, 20, 30])));
        let encoded = STANDARD.encode(&bytes);

        let plain = load_image(&ImageSource::Base64(encoded.clone())).unwrap();
        assert_eq!(plain.dimensions(), (4, 4));

        let url = format!("data:image/png;base64,{}", encoded);
        let from_url = load_image(&ImageSource::Base64(url)).unwrap();
        assert_eq!(from_url.get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_load_image_invalid_base64() {
        let result = load_image(&ImageSource::Base64("***".to_string()));
        assert!(matches!(result, Err(AnalysisError::InvalidBase64(_))));
    }

    #[test]
    fn test_luminance_is_new_buffer() {
        let rgb = RgbImage::from_pixel(3, 3, Rgb([200, 200, 200]));
        let gray = luminance(&rgb);
        assert_eq!(gray.dimensions(), (3, 3));
        assert_eq!(gray.get_pixel(1, 1)[0], 200);
        assert_eq!(rgb.get_pixel(1, 1), &Rgb([200, 200, 200]));
    }

    #[test]
    fn test_luminance_uses_bt601_weights() {
        let rgb = RgbImage::from_fn(5, 1, |x, _| match x {
            0 => Rgb([255, 0, 0]),
            1 => Rgb([0, 255, 0]),
            2 => Rgb([0, 0, 255]),
            3 => Rgb([50, 180, 50]),
            _ => Rgb([101, 67, 33]),
        });
        let gray = luminance(&rgb);
        let values: Vec<u8> = gray.pixels().map(|p| p[0]).collect();
        assert_eq!(values, vec![76, 150, 29, 126, 73]);
    }

    #[test]
    fn test_luminance_keeps_grays() {
        for v in [0u8, 1, 127, 128, 254, 255] {
            let gray = luminance(&RgbImage::from_pixel(1, 1, Rgb([v, v, v])));
            assert_eq!(gray.get_pixel(0, 0)[0], v);
        }
    }

    #[test]
    fn test_luminance_stats() {
        let gray = GrayImage::from_fn(2, 1, |x, _| image::Luma([if x == 0 { 0 } else { 100 }]));
        let (mean, variance) = luminance_stats(&gray);
        assert_eq!(mean, 50.0);
        assert_eq!(variance, 2500.0);
    }

    #[test]
    fn test_is_supported_image() {
        assert!(is_supported_image(Path::new("leaf.PNG")));
        assert!(is_supported_image(Path::new("dir/leaf.jpeg")));
        assert!(is_supported_image(Path::new("leaf.webp")));
        assert!(!is_supported_image(Path::new("notes.txt")));
        assert!(!is_supported_image(Path::new("no_extension")));
    }
}
