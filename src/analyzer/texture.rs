//! Texture Profiler: luminance variance as a uniformity signal.

use image::RgbImage;

use super::image_prep::{luminance, luminance_stats};
use super::types::TextureProfile;
use crate::rules::thresholds::TextureThresholds;

pub fn profile_texture(image: &RgbImage, thresholds: &TextureThresholds) -> TextureProfile {
    let (_, variance) = luminance_stats(&luminance(image));
    TextureProfile {
        variance,
        is_uniform: variance < thresholds.uniform_variance,
    }
}
