//! Profile types produced by the feature extractors.
//!
//! Each profile is derived purely from one decoded image and is never
//! mutated after construction.

use serde::{Deserialize, Serialize};

/// Pixel-coverage percentages of leaf colors plus the aggregate vigor signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorProfile {
    /// Percentage of pixels classified as green (0-100)
    pub green_pct: f64,
    /// Percentage of pixels classified as brown (0-100)
    pub brown_pct: f64,
    /// Percentage of pixels classified as yellow (0-100)
    pub yellow_pct: f64,
    /// `green_pct - (brown_pct + 0.7 * yellow_pct)`, typically -100..100
    pub health_score: f64,
}

impl ColorProfile {
    /// Weighted non-green damage signal: `brown + 0.7 * yellow`.
    pub fn discoloration_score(&self) -> f64 {
        self.brown_pct + YELLOW_WEIGHT * self.yellow_pct
    }
}

/// Weight applied to yellow coverage in health and discoloration scores.
pub const YELLOW_WEIGHT: f64 = 0.7;

/// Dark-spot coverage computed against an image-relative luminance threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotProfile {
    /// Percentage of pixels darker than `mean - k * stddev` (0-100)
    pub spot_pct: f64,
    pub has_significant_spots: bool,
}

/// Luminance variance as a surface-uniformity signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextureProfile {
    /// Population variance of 8-bit luminance
    pub variance: f64,
    pub is_uniform: bool,
}

/// The three feature profiles of one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Profiles {
    pub color: ColorProfile,
    pub spot: SpotProfile,
    pub texture: TextureProfile,
}

/// Round to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `count / total * 100`, rounded to two decimals.
pub(crate) fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(count as f64 / total as f64 * 100.0)
}
