//! Optional learned predictor.
//!
//! A trained binary model scores a resized, normalized image with a single
//! value in [0, 1]. Scores above `healthy_above` (0.5 by default) mean
//! healthy; anything else is diseased, with severity tiered by how far the
//! score falls below the cut.
//!
//! Failures are returned as `PredictionOutcome::Failed` so the classifier
//! can branch to the rule engine explicitly.

#[cfg(feature = "onnx")]
pub mod onnx;

use image::imageops::FilterType;
use image::RgbImage;
use ndarray::Array4;

use crate::analyzer::types::round2;
use crate::error::PredictorError;
use crate::rules::thresholds::LearnedThresholds;
use crate::rules::{Category, Classification, Severity};

/// A trained binary classifier.
pub trait LearnedPredictor: Send + Sync {
    /// Short identifier for logs (e.g., the model file name).
    fn name(&self) -> &str;

    /// Probability-like score in [0, 1]; higher means healthier.
    fn score(&self, image: &RgbImage) -> Result<f32, PredictorError>;
}

/// Result of one learned-path invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Prediction(Classification),
    Failed(String),
}

/// Score an image and interpret the result, capturing any failure.
pub fn predict(
    predictor: &dyn LearnedPredictor,
    image: &RgbImage,
    thresholds: &LearnedThresholds,
) -> PredictionOutcome {
    match predictor
        .score(image)
        .and_then(|score| interpret_score(score, thresholds))
    {
        Ok(classification) => PredictionOutcome::Prediction(classification),
        Err(e) => PredictionOutcome::Failed(e.to_string()),
    }
}

/// Map a raw model score to category, confidence, and severity.
pub fn interpret_score(
    score: f32,
    thresholds: &LearnedThresholds,
) -> Result<Classification, PredictorError> {
    if !(0.0..=1.0).contains(&score) {
        return Err(PredictorError::ScoreOutOfRange(score));
    }

    if score > thresholds.healthy_above {
        return Ok(Classification {
            category: Category::Healthy,
            confidence: round2(score as f64 * 100.0),
            severity: Severity::None,
        });
    }

    let severity = if score < thresholds.high_severity_below {
        Severity::High
    } else if score < thresholds.medium_severity_below {
        Severity::Medium
    } else {
        Severity::Low
    };

    Ok(Classification {
        category: Category::Diseased,
        confidence: round2((1.0 - score as f64) * 100.0),
        severity,
    })
}

/// Resize to `size`x`size` and scale channels to [0, 1] in NHWC layout,
/// shape `(1, size, size, 3)`. The caller's image is left untouched.
pub fn preprocess(image: &RgbImage, size: u32) -> Result<Array4<f32>, PredictorError> {
    let resized = image::imageops::resize(image, size, size, FilterType::Triangle);
    let data: Vec<f32> = resized
        .into_raw()
        .into_iter()
        .map(|v| v as f32 / 255.0)
        .collect();

    Array4::from_shape_vec((1, size as usize, size as usize, 3), data)
        .map_err(|e| PredictorError::Invocation(format!("Failed to create tensor: {}", e)))
}
