//! Type definitions for the rule-based classifier.
//!
//! These types serialize to stable snake_case labels so a presentation
//! layer can store or render them without knowing the enums.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Diagnostic category produced by the rule engine or the learned predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Healthy,
    Diseased,
    EarlyBlight,
    LateBlight,
    PowderyMildew,
    BacterialSpot,
    FungalLeafSpot,
    NutrientDeficiency,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Healthy,
        Category::Diseased,
        Category::EarlyBlight,
        Category::LateBlight,
        Category::PowderyMildew,
        Category::BacterialSpot,
        Category::FungalLeafSpot,
        Category::NutrientDeficiency,
    ];

    /// Stable label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Healthy => "healthy",
            Category::Diseased => "diseased",
            Category::EarlyBlight => "early_blight",
            Category::LateBlight => "late_blight",
            Category::PowderyMildew => "powdery_mildew",
            Category::BacterialSpot => "bacterial_spot",
            Category::FungalLeafSpot => "fungal_leaf_spot",
            Category::NutrientDeficiency => "nutrient_deficiency",
        }
    }

    /// Parse a label; `None` for anything unrecognized.
    pub fn from_label(label: &str) -> Option<Category> {
        let needle = label.trim().to_ascii_lowercase();
        Category::ALL.into_iter().find(|c| c.label() == needle)
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, Category::Healthy)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordinal disease intensity. Ordering is `None < Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::None => "None",
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        };
        f.write_str(s)
    }
}

/// Which guard cascade the rule engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    /// healthy vs. diseased
    #[default]
    Binary,
    /// Distinguishes specific disease signatures before the generic fallback
    Detailed,
}

impl ClassifierMode {
    /// Every category this mode's cascade can emit.
    pub fn producible_categories(&self) -> &'static [Category] {
        match self {
            ClassifierMode::Binary => &[Category::Healthy, Category::Diseased],
            ClassifierMode::Detailed => &Category::ALL,
        }
    }
}

/// Output of either classification path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    /// Confidence percentage in [0, 100]
    pub confidence: f64,
    pub severity: Severity,
}
