//! Spot Detector: dark-lesion coverage against an image-relative threshold.
//!
//! The cutoff is `mean - k * stddev` of luminance for the image at hand, so
//! exposure differences between photos do not shift the result.

use image::RgbImage;

use super::image_prep::{luminance, luminance_stats};
use super::types::{percentage, SpotProfile};
use crate::rules::thresholds::SpotThresholds;

pub fn detect_spots(image: &RgbImage, thresholds: &SpotThresholds) -> SpotProfile {
    let gray = luminance(image);
    let (mean, variance) = luminance_stats(&gray);
    let cutoff = mean - variance.sqrt() * thresholds.k;

    let dark = gray.as_raw().iter().filter(|&&v| (v as f64) < cutoff).count() as u64;
    let spot_pct = percentage(dark, gray.as_raw().len() as u64);

    SpotProfile {
        spot_pct,
        has_significant_spots: spot_pct > thresholds.significant_pct,
    }
}
