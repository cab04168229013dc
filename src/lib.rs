//! Plant foliage health classification from leaf photographs.
//!
//! Color, spot, and texture statistics are extracted from an RGB image and
//! fed through a rule cascade (or an optional learned model) to produce a
//! [`Diagnosis`] with treatment and prevention text.

pub mod analyzer;
pub mod classifier;
pub mod config;
pub mod diagnosis;
pub mod error;
pub mod knowledge;
pub mod predictor;
pub mod report;
pub mod rules;

pub use analyzer::ImageSource;
pub use classifier::LeafClassifier;
pub use config::ClassifierConfig;
pub use diagnosis::{Diagnosis, DiagnosisDetails};
pub use error::{AnalysisError, ConfigError, PredictorError};
pub use knowledge::KnowledgeBase;
pub use predictor::{LearnedPredictor, PredictionOutcome};
pub use rules::{Category, ClassifierMode, Severity};
