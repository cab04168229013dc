use std::path::PathBuf;

use thiserror::Error;

/// The single failure type surfaced by `LeafClassifier::analyze`.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Image analysis failed: cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image analysis failed: cannot decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image analysis failed: invalid base64 image data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Image analysis failed: image has no pixels")]
    EmptyImage,
}

/// Failures while loading configuration, thresholds, or the knowledge base.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config error: cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error: invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Knowledge base error: no entry for category '{0}'")]
    MissingCategory(String),

    #[error("Threshold error: {0}")]
    InvalidThreshold(String),
}

/// Failures of the learned predictor. Never escapes the classifier.
#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("Model artifact not found: {0}")]
    MissingArtifact(PathBuf),

    #[error("Model load failed: {0}")]
    Load(String),

    #[error("Model invocation failed: {0}")]
    Invocation(String),

    #[error("Model returned out-of-range score {0}")]
    ScoreOutOfRange(f32),
}
