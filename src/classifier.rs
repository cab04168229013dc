//! `LeafClassifier`: the single synchronous entry point.
//!
//! Built once from a `ClassifierConfig`. Construction loads thresholds and
//! the knowledge base, validates the knowledge base against the categories
//! the configured mode can emit, and attempts the model load at most once.
//! After that the classifier is read-only and can be shared across threads.

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::analyzer::{extract_profiles, load_image, ImageSource, Profiles};
use crate::config::ClassifierConfig;
use crate::diagnosis::{assemble, Diagnosis};
use crate::error::{AnalysisError, ConfigError};
use crate::knowledge::KnowledgeBase;
use crate::predictor::{predict, LearnedPredictor, PredictionOutcome};
use crate::rules::{default_thresholds, Classification, ClassifierMode, RuleEngine, Thresholds};

pub struct LeafClassifier {
    engine: RuleEngine,
    knowledge: KnowledgeBase,
    predictor: Option<Box<dyn LearnedPredictor>>,
}

impl LeafClassifier {
    /// Build from configuration. A model that fails to load leaves the
    /// learned path inactive for the lifetime of this classifier.
    pub fn new(config: &ClassifierConfig) -> Result<Self, ConfigError> {
        let thresholds = config.thresholds()?;
        let knowledge = config.knowledge_base()?;
        let predictor = load_predictor(config, &thresholds);

        let classifier = Self::with_predictor(thresholds, knowledge, config.mode, predictor)?;
        info!(
            "Leaf classifier ready ({:?} mode, learned path {})",
            classifier.mode(),
            if classifier.learned_path_active() { "active" } else { "inactive" }
        );
        Ok(classifier)
    }

    /// Build from already-loaded parts, optionally with a predictor.
    pub fn with_predictor(
        thresholds: Thresholds,
        knowledge: KnowledgeBase,
        mode: ClassifierMode,
        predictor: Option<Box<dyn LearnedPredictor>>,
    ) -> Result<Self, ConfigError> {
        thresholds.validate()?;
        knowledge.validate(mode)?;

        Ok(Self {
            engine: RuleEngine::new(thresholds, mode),
            knowledge,
            predictor,
        })
    }

    /// Rule-based only, embedded thresholds and knowledge base.
    pub fn rule_based(mode: ClassifierMode) -> Self {
        Self {
            engine: RuleEngine::new(default_thresholds(), mode),
            knowledge: KnowledgeBase::default(),
            predictor: None,
        }
    }

    /// Whether a learned predictor loaded successfully.
    pub fn learned_path_active(&self) -> bool {
        self.predictor.is_some()
    }

    pub fn mode(&self) -> ClassifierMode {
        self.engine.mode()
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Decode `source` and diagnose it.
    pub fn analyze(&self, source: &ImageSource) -> Result<Diagnosis, AnalysisError> {
        let image = load_image(source)?;
        Ok(self.analyze_image(&image))
    }

    /// Diagnose an already-decoded image. The image is only read.
    pub fn analyze_image(&self, image: &RgbImage) -> Diagnosis {
        let profiles = extract_profiles(image, self.engine.thresholds());
        debug!(
            "Profiles: green {:.2}%, brown {:.2}%, yellow {:.2}%, health {:.2}, spots {:.2}%, variance {:.1}",
            profiles.color.green_pct,
            profiles.color.brown_pct,
            profiles.color.yellow_pct,
            profiles.color.health_score,
            profiles.spot.spot_pct,
            profiles.texture.variance
        );

        let diagnosis = match self.try_learned(image) {
            Some(classification) => assemble(classification, &profiles, true, &self.knowledge),
            None => self.rule_based_diagnosis(&profiles),
        };

        info!(
            "Verdict: {} ({:.2}% confidence, severity {}{})",
            diagnosis.category,
            diagnosis.confidence,
            diagnosis.severity,
            if diagnosis.details.ml_powered { ", learned" } else { "" }
        );
        diagnosis
    }

    fn try_learned(&self, image: &RgbImage) -> Option<Classification> {
        let predictor = self.predictor.as_deref()?;
        match predict(predictor, image, &self.engine.thresholds().learned) {
            PredictionOutcome::Prediction(classification) => Some(classification),
            PredictionOutcome::Failed(reason) => {
                warn!(
                    "Learned predictor {} failed, using rule engine: {}",
                    predictor.name(),
                    reason
                );
                None
            }
        }
    }

    fn rule_based_diagnosis(&self, profiles: &Profiles) -> Diagnosis {
        let classification = self.engine.classify_profiles(profiles);
        assemble(classification, profiles, false, &self.knowledge)
    }
}

#[cfg(feature = "onnx")]
fn load_predictor(
    config: &ClassifierConfig,
    thresholds: &Thresholds,
) -> Option<Box<dyn LearnedPredictor>> {
    use crate::predictor::onnx::OnnxPredictor;

    let path = config.model_path.as_deref()?;
    match OnnxPredictor::load(path, thresholds.learned.input_size, config.intra_threads) {
        Ok(predictor) => Some(Box::new(predictor)),
        Err(e) => {
            warn!("Learned path disabled: {}", e);
            None
        }
    }
}

#[cfg(not(feature = "onnx"))]
fn load_predictor(
    config: &ClassifierConfig,
    _thresholds: &Thresholds,
) -> Option<Box<dyn LearnedPredictor>> {
    if let Some(path) = &config.model_path {
        warn!(
            "Learned path disabled: built without the `onnx` feature, ignoring {}",
            path.display()
        );
    }
    None
}
