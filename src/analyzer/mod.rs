//! Feature extraction from leaf photographs.
//!
//! Three independent profilers read the same decoded image:
//! color coverage, dark-spot coverage, and luminance texture.

pub mod color;
pub mod image_prep;
pub mod spots;
pub mod texture;
pub mod types;

use image::RgbImage;

pub use color::{classify_pixel, profile_colors, PixelClass};
pub use image_prep::{is_supported_image, load_image, ImageSource, SUPPORTED_EXTENSIONS};
pub use spots::detect_spots;
pub use texture::profile_texture;
pub use types::*;

use crate::rules::thresholds::Thresholds;

/// Run all three profilers over one image.
pub fn extract_profiles(image: &RgbImage, thresholds: &Thresholds) -> Profiles {
    Profiles {
        color: profile_colors(image, &thresholds.color),
        spot: detect_spots(image, &thresholds.spots),
        texture: profile_texture(image, &thresholds.texture),
    }
}
