//! Diagnosis Assembler.
//!
//! Joins a classification with the knowledge-base text for its category and
//! the raw profiles it was derived from.

use serde::{Deserialize, Serialize};

use crate::analyzer::{ColorProfile, Profiles, SpotProfile, TextureProfile};
use crate::knowledge::KnowledgeBase;
use crate::rules::{Category, Classification, Severity};

/// Raw signals behind a verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisDetails {
    pub color: ColorProfile,
    pub spot: SpotProfile,
    pub texture: TextureProfile,
    /// True when the learned predictor produced the verdict
    pub ml_powered: bool,
}

/// Final record returned for one analyzed image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub category: Category,
    /// Knowledge-base display name (e.g., "Healthy Plant")
    pub name: String,
    /// Confidence percentage in [0, 100]
    pub confidence: f64,
    pub severity: Severity,
    pub description: String,
    pub treatment: String,
    pub prevention: String,
    pub details: DiagnosisDetails,
}

impl Diagnosis {
    pub fn is_healthy(&self) -> bool {
        self.category.is_healthy()
    }
}

/// Build the final record. Categories without a knowledge-base entry take
/// the `healthy` text; the category itself is kept as given.
pub fn assemble(
    classification: Classification,
    profiles: &Profiles,
    ml_powered: bool,
    knowledge: &KnowledgeBase,
) -> Diagnosis {
    let entry = knowledge.entry(classification.category);

    Diagnosis {
        category: classification.category,
        name: entry.name.clone(),
        confidence: classification.confidence,
        severity: classification.severity,
        description: entry.description.clone(),
        treatment: entry.treatment.clone(),
        prevention: entry.prevention.clone(),
        details: DiagnosisDetails {
            color: profiles.color,
            spot: profiles.spot,
            texture: profiles.texture,
            ml_powered,
        },
    }
}
