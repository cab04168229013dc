//! Color Profiler: green / brown / yellow pixel coverage and health score.

use image::RgbImage;

use super::types::{percentage, round2, ColorProfile, YELLOW_WEIGHT};
use crate::rules::thresholds::ColorThresholds;

/// Exclusive color class of a single pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelClass {
    Green,
    Yellow,
    Brown,
}

// Brown: warm, desaturated, blue-deficient tone
const BROWN_RED_RANGE: (u8, u8) = (80, 220);
const BROWN_GREEN_RANGE: (u8, u8) = (40, 180);
const BROWN_BLUE_CAP: u8 = 120;

// Yellow: chlorotic tissue
const YELLOW_FLOOR: u8 = 120;
const YELLOW_BLUE_CAP: u8 = 120;

fn is_green(r: u8, g: u8, b: u8, green_floor: u8) -> bool {
    g > r && g > b && g > green_floor
}

fn is_yellow(r: u8, g: u8, b: u8) -> bool {
    r > YELLOW_FLOOR && g > YELLOW_FLOOR && b < YELLOW_BLUE_CAP && r > b && g > b
}

fn is_brown(r: u8, g: u8, b: u8) -> bool {
    let red_ok = r > BROWN_RED_RANGE.0 && r < BROWN_RED_RANGE.1;
    let green_ok = g > BROWN_GREEN_RANGE.0 && g < BROWN_GREEN_RANGE.1;
    red_ok && green_ok && b < BROWN_BLUE_CAP && r > b
}

/// Assign a pixel to at most one class. Green wins over yellow, yellow over
/// brown, so the three coverage percentages never double-count a pixel.
pub fn classify_pixel(r: u8, g: u8, b: u8, green_floor: u8) -> Option<PixelClass> {
    if is_green(r, g, b, green_floor) {
        Some(PixelClass::Green)
    } else if is_yellow(r, g, b) {
        Some(PixelClass::Yellow)
    } else if is_brown(r, g, b) {
        Some(PixelClass::Brown)
    } else {
        None
    }
}

/// Compute color coverage over every pixel of the image.
pub fn profile_colors(image: &RgbImage, thresholds: &ColorThresholds) -> ColorProfile {
    let total = image.width() as u64 * image.height() as u64;
    let (mut green, mut brown, mut yellow) = (0u64, 0u64, 0u64);

    for pixel in image.pixels() {
        let [r, g, b] = pixel.0;
        match classify_pixel(r, g, b, thresholds.green_floor) {
            Some(PixelClass::Green) => green += 1,
            Some(PixelClass::Yellow) => yellow += 1,
            Some(PixelClass::Brown) => brown += 1,
            None => {}
        }
    }

    let green_pct = percentage(green, total);
    let brown_pct = percentage(brown, total);
    let yellow_pct = percentage(yellow, total);
    let health_score = round2(green_pct - (brown_pct + YELLOW_WEIGHT * yellow_pct));

    ColorProfile {
        green_pct,
        brown_pct,
        yellow_pct,
        health_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn floor() -> ColorThresholds {
        ColorThresholds { green_floor: 50 }
    }

    #[test]
    fn test_classify_basic_colors() {
        assert_eq!(classify_pixel(50, 180, 50, 50), Some(PixelClass::Green));
        assert_eq!(classify_pixel(101, 67, 33, 50), Some(PixelClass::Brown));
        assert_eq!(classify_pixel(200, 200, 50, 50), Some(PixelClass::Yellow));
        assert_eq!(classify_pixel(245, 245, 245, 50), None);
        assert_eq!(classify_pixel(0, 0, 0, 50), None);
    }

    #[test]
    fn test_green_floor_is_strict() {
        assert_eq!(classify_pixel(10, 50, 10, 50), None);
        assert_eq!(classify_pixel(10, 51, 10, 50), Some(PixelClass::Green));
    }

    #[test]
    fn test_brown_red_range_is_open() {
        assert!(!is_brown(80, 60, 30));
        assert!(is_brown(81, 60, 30));
        assert!(is_brown(219, 60, 30));
        assert!(!is_brown(220, 60, 30));
        assert_eq!(classify_pixel(80, 60, 30, 50), None);
        assert_eq!(classify_pixel(81, 60, 30, 50), Some(PixelClass::Brown));
        assert_eq!(classify_pixel(220, 60, 30, 50), None);
    }

    #[test]
    fn test_brown_green_range_is_open() {
        assert!(!is_brown(100, 40, 30));
        assert!(is_brown(100, 41, 30));
        assert!(is_brown(200, 179, 30));
        assert!(!is_brown(200, 180, 30));
        assert_eq!(classify_pixel(100, 40, 30, 50), None);
        assert_eq!(classify_pixel(100, 41, 30, 50), Some(PixelClass::Brown));
        // Above the yellow floor the yellow class takes these pixels first
        assert_eq!(classify_pixel(200, 180, 30, 50), Some(PixelClass::Yellow));
    }

    #[test]
    fn test_brown_blue_cap() {
        assert!(is_brown(150, 100, 119));
        assert!(!is_brown(150, 100, 120));
        assert_eq!(classify_pixel(150, 100, 119, 50), Some(PixelClass::Brown));
        assert_eq!(classify_pixel(150, 100, 120, 50), None);
        // red must exceed blue
        assert!(!is_brown(90, 60, 90));
    }

    #[test]
    fn test_yellow_floor_and_cap() {
        assert!(!is_yellow(120, 150, 50));
        assert!(is_yellow(121, 150, 50));
        assert!(!is_yellow(150, 120, 50));
        assert!(is_yellow(150, 121, 50));
        assert!(is_yellow(150, 150, 119));
        assert!(!is_yellow(150, 150, 120));

        assert_eq!(classify_pixel(150, 121, 50, 50), Some(PixelClass::Yellow));
        // g = 120 drops out of yellow and lands in brown
        assert_eq!(classify_pixel(150, 120, 50, 50), Some(PixelClass::Brown));
        // b = 120 misses every class
        assert_eq!(classify_pixel(150, 150, 120, 50), None);
    }

    #[test]
    fn test_classes_are_exclusive() {
        // Green-dominant pixel that also sits inside the brown ranges
        assert_eq!(classify_pixel(100, 150, 50, 50), Some(PixelClass::Green));
        // Yellow pixel that also sits inside the brown ranges
        assert_eq!(classify_pixel(150, 150, 50, 50), Some(PixelClass::Yellow));

        let image = RgbImage::from_fn(64, 64, |x, y| Rgb([(x * 4) as u8, (y * 4) as u8, 60]));
        let profile = profile_colors(&image, &floor());
        assert!(profile.green_pct + profile.brown_pct + profile.yellow_pct <= 100.0 + 1e-9);
    }

    #[test]
    fn test_solid_green_profile() {
        let image = RgbImage::from_pixel(40, 30, Rgb([50, 180, 50]));
        let profile = profile_colors(&image, &floor());
        assert_eq!(profile.green_pct, 100.0);
        assert_eq!(profile.brown_pct, 0.0);
        assert_eq!(profile.yellow_pct, 0.0);
        assert_eq!(profile.health_score, 100.0);
    }

    #[test]
    fn test_mixed_profile_and_health_score() {
        // 50% green, 25% brown, 25% yellow
        let image = RgbImage::from_fn(4, 1, |x, _| match x {
            0 | 1 => Rgb([50, 180, 50]),
            2 => Rgb([101, 67, 33]),
            _ => Rgb([200, 200, 50]),
        });
        let profile = profile_colors(&image, &floor());
        assert_eq!(profile.green_pct, 50.0);
        assert_eq!(profile.brown_pct, 25.0);
        assert_eq!(profile.yellow_pct, 25.0);
        assert_eq!(profile.health_score, 7.5);
    }

    #[test]
    fn test_percentages_are_rounded() {
        let image = RgbImage::from_fn(3, 1, |x, _| {
            if x == 0 {
                Rgb([50, 180, 50])
            } else {
                Rgb([0, 0, 0])
            }
        });
        let profile = profile_colors(&image, &floor());
        assert_eq!(profile.green_pct, 33.33);
    }
}
