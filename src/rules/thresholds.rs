//! TOML threshold loading for the feature extractors and rule engine.
//!
//! Provides two loading methods:
//! - `default_thresholds()` - Embedded tuning compiled into the binary
//! - `load_thresholds(path)` - A replacement file calibrated elsewhere

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::types::Category;
use crate::error::ConfigError;

/// Default thresholds embedded in the binary at compile time.
const DEFAULT_THRESHOLDS: &str = include_str!("../../config/thresholds.toml");

/// Root threshold configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub color: ColorThresholds,
    pub spots: SpotThresholds,
    pub texture: TextureThresholds,
    pub healthy: HealthyThresholds,
    pub diseased: DiseasedThresholds,
    pub severity: SeverityThresholds,
    pub learned: LearnedThresholds,
    /// Detailed-mode disease signatures, in cascade order
    #[serde(default)]
    pub signatures: Vec<Signature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorThresholds {
    pub green_floor: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotThresholds {
    pub k: f64,
    pub significant_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureThresholds {
    pub uniform_variance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthyThresholds {
    pub min_green_pct: f64,
    pub max_discoloration: f64,
    pub max_spot_pct: f64,
    pub min_health_score: f64,
    pub confidence_floor: f64,
    pub confidence_ceiling: f64,
    pub confidence_base: f64,
    pub confidence_penalty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseasedThresholds {
    pub confidence_base: f64,
    pub confidence_ceiling: f64,
    pub discoloration_bonus_above: f64,
    pub discoloration_bonus: f64,
    pub spot_bonus_above: f64,
    pub spot_bonus: f64,
    pub low_green_bonus_below: f64,
    pub low_green_bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityThresholds {
    pub high_score: f64,
    pub high_green_below: f64,
    pub medium_score: f64,
    pub medium_brown: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedThresholds {
    pub input_size: u32,
    pub healthy_above: f32,
    pub high_severity_below: f32,
    pub medium_severity_below: f32,
}

/// Profile value a signature scales confidence and severity by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Brown,
    Spot,
    Yellow,
}

/// Open interval on one profile value. A missing side is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Band {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub above: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub below: Option<f64>,
}

impl Band {
    pub fn contains(&self, value: f64) -> bool {
        self.above.map_or(true, |min| value > min) && self.below.map_or(true, |max| value < max)
    }
}

/// One disease signature of the detailed cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub category: Category,
    #[serde(default)]
    pub brown: Band,
    #[serde(default)]
    pub spot: Band,
    #[serde(default)]
    pub yellow: Band,
    /// Only match when the texture is not uniform
    #[serde(default)]
    pub irregular_texture: bool,
    /// Signal whose excess over its band's `above` scales confidence
    pub strength: Signal,
    /// `[lo, hi]` confidence range
    pub confidence: (f64, f64),
    pub gain: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium_above: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_above: Option<f64>,
}

impl Signature {
    pub fn band(&self, signal: Signal) -> &Band {
        match signal {
            Signal::Brown => &self.brown,
            Signal::Spot => &self.spot,
            Signal::Yellow => &self.yellow,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| {
            Err(ConfigError::InvalidThreshold(format!(
                "signature {}: {}",
                self.category, msg
            )))
        };

        if matches!(self.category, Category::Healthy | Category::Diseased) {
            return invalid("category must be a specific disease");
        }
        for band in [&self.brown, &self.spot, &self.yellow] {
            if let (Some(min), Some(max)) = (band.above, band.below) {
                if min >= max {
                    return invalid("band is empty");
                }
            }
        }
        if self.band(self.strength).above.is_none() {
            return invalid("strength signal needs an `above` bound");
        }
        let (lo, hi) = self.confidence;
        if !(0.0..=100.0).contains(&lo) || !(0.0..=100.0).contains(&hi) || lo > hi {
            return invalid("confidence must satisfy 0 <= lo <= hi <= 100");
        }
        if self.gain < 0.0 {
            return invalid("gain must be non-negative");
        }
        if let (Some(medium), Some(high)) = (self.medium_above, self.high_above) {
            if medium > high {
                return invalid("medium_above exceeds high_above");
            }
        }
        // Severity may never fall as brown rises.
        if self.brown.below.is_some() && (self.medium_above.is_some() || self.high_above.is_some()) {
            return invalid("a `below` bound on brown cannot be combined with severity tiers");
        }
        Ok(())
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        default_thresholds()
    }
}

impl Thresholds {
    /// Parse and validate a TOML threshold document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let thresholds: Thresholds = toml::from_str(content)?;
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Reject values that would make the cascade or the learned-score
    /// interpretation inconsistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spots.k < 0.0 {
            return Err(ConfigError::InvalidThreshold(format!(
                "spots.k must be non-negative, got {}",
                self.spots.k
            )));
        }
        if self.texture.uniform_variance < 0.0 {
            return Err(ConfigError::InvalidThreshold(
                "texture.uniform_variance must be non-negative".to_string(),
            ));
        }
        if self.healthy.confidence_floor > self.healthy.confidence_ceiling {
            return Err(ConfigError::InvalidThreshold(
                "healthy.confidence_floor exceeds confidence_ceiling".to_string(),
            ));
        }
        if self.severity.medium_score > self.severity.high_score {
            return Err(ConfigError::InvalidThreshold(
                "severity.medium_score exceeds high_score".to_string(),
            ));
        }
        let learned = &self.learned;
        if learned.input_size == 0 {
            return Err(ConfigError::InvalidThreshold(
                "learned.input_size must be positive".to_string(),
            ));
        }
        let ordered = 0.0 <= learned.high_severity_below
            && learned.high_severity_below <= learned.medium_severity_below
            && learned.medium_severity_below <= learned.healthy_above
            && learned.healthy_above < 1.0;
        if !ordered {
            return Err(ConfigError::InvalidThreshold(
                "learned cut points must satisfy 0 <= high <= medium <= healthy_above < 1"
                    .to_string(),
            ));
        }
        for signature in &self.signatures {
            signature.validate()?;
        }
        Ok(())
    }
}

/// Load thresholds from a TOML file at the given path.
pub fn load_thresholds(path: &Path) -> Result<Thresholds, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    Thresholds::from_toml(&content)
}

/// Get the default thresholds embedded in the binary.
///
/// # Panics
/// Panics if the embedded TOML is invalid (this would be a compile-time bug).
pub fn default_thresholds() -> Thresholds {
    Thresholds::from_toml(DEFAULT_THRESHOLDS).expect("embedded thresholds.toml must be valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_load() {
        let t = default_thresholds();
        assert_eq!(t.color.green_floor, 50);
        assert_eq!(t.spots.k, 0.8);
        assert_eq!(t.spots.significant_pct, 8.0);
        assert_eq!(t.texture.uniform_variance, 500.0);
        assert_eq!(t.healthy.min_green_pct, 15.0);
        assert_eq!(t.learned.input_size, 224);
        assert_eq!(t.learned.healthy_above, 0.5);
    }

    #[test]
    fn test_default_signatures_in_cascade_order() {
        let categories: Vec<Category> = default_thresholds()
            .signatures
            .iter()
            .map(|s| s.category)
            .collect();
        assert_eq!(
            categories,
            vec![
                Category::LateBlight,
                Category::EarlyBlight,
                Category::BacterialSpot,
                Category::PowderyMildew,
                Category::NutrientDeficiency,
                Category::FungalLeafSpot,
            ]
        );
    }

    #[test]
    fn test_signatures_optional() {
        let end = DEFAULT_THRESHOLDS
            .find("[[signatures]]")
            .expect("embedded thresholds have signatures");
        let t = Thresholds::from_toml(&DEFAULT_THRESHOLDS[..end]).unwrap();
        assert!(t.signatures.is_empty());
    }

    #[test]
    fn test_band_is_open_interval() {
        let band = Band {
            above: Some(5.0),
            below: Some(10.0),
        };
        assert!(!band.contains(5.0));
        assert!(band.contains(5.01));
        assert!(band.contains(9.99));
        assert!(!band.contains(10.0));
        assert!(Band::default().contains(-1.0));
    }

    #[test]
    fn test_brown_capped_signature_cannot_have_tiers() {
        let content = DEFAULT_THRESHOLDS.replace(
            "strength = \"yellow\"\nconfidence = [70.0, 88.0]\ngain = 0.6",
            "strength = \"yellow\"\nconfidence = [70.0, 88.0]\ngain = 0.6\nmedium_above = 35.0",
        );
        assert_ne!(content, DEFAULT_THRESHOLDS);
        let result = Thresholds::from_toml(&content);
        assert!(matches!(result, Err(ConfigError::InvalidThreshold(_))));
    }

    #[test]
    fn test_signature_needs_strength_bound() {
        let content = DEFAULT_THRESHOLDS.replace(
            "brown = { above = 3.0 }\nspot = { above = 5.0 }",
            "brown = { above = 3.0 }",
        );
        assert_ne!(content, DEFAULT_THRESHOLDS);
        let result = Thresholds::from_toml(&content);
        assert!(matches!(result, Err(ConfigError::InvalidThreshold(_))));
    }

    #[test]
    fn test_generic_category_signature_rejected() {
        let content =
            DEFAULT_THRESHOLDS.replace("category = \"late_blight\"", "category = \"diseased\"");
        let result = Thresholds::from_toml(&content);
        assert!(matches!(result, Err(ConfigError::InvalidThreshold(_))));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result = Thresholds::from_toml("[color]\ngreen_floor = \"lots\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_negative_k_rejected() {
        let content = DEFAULT_THRESHOLDS.replace("k = 0.8", "k = -1.0");
        let result = Thresholds::from_toml(&content);
        assert!(matches!(result, Err(ConfigError::InvalidThreshold(_))));
    }

    #[test]
    fn test_unordered_learned_cuts_rejected() {
        let content =
            DEFAULT_THRESHOLDS.replace("high_severity_below = 0.2", "high_severity_below = 0.4");
        let result = Thresholds::from_toml(&content);
        assert!(matches!(result, Err(ConfigError::InvalidThreshold(_))));
    }

    #[test]
    fn test_load_thresholds_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thresholds.toml");
        let content = DEFAULT_THRESHOLDS.replace("uniform_variance = 500.0", "uniform_variance = 450.0");
        std::fs::write(&path, content).unwrap();

        let t = load_thresholds(&path).unwrap();
        assert_eq!(t.texture.uniform_variance, 450.0);
    }

    #[test]
    fn test_load_thresholds_missing_file() {
        let result = load_thresholds(Path::new("/no/such/thresholds.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
