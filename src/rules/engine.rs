//! Rule evaluation engine for leaf classification.
//!
//! The `RuleEngine` runs an ordered guard cascade over the three feature
//! profiles. The first guard that matches decides the category; later
//! guards are never consulted.

use tracing::debug;

use super::thresholds::{Signal, Signature, Thresholds};
use super::types::*;
use crate::analyzer::types::{round2, ColorProfile, Profiles, SpotProfile, TextureProfile};

/// The rule evaluation engine.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    thresholds: Thresholds,
    mode: ClassifierMode,
}

/// Profile values a guard can key on.
#[derive(Debug, Clone, Copy)]
struct Signals {
    green: f64,
    brown: f64,
    yellow: f64,
    spot: f64,
    uniform: bool,
}

impl Signals {
    fn new(color: &ColorProfile, spot: &SpotProfile, texture: &TextureProfile) -> Self {
        Self {
            green: color.green_pct,
            brown: color.brown_pct,
            yellow: color.yellow_pct,
            spot: spot.spot_pct,
            uniform: texture.is_uniform,
        }
    }

    fn get(&self, signal: Signal) -> f64 {
        match signal {
            Signal::Brown => self.brown,
            Signal::Spot => self.spot,
            Signal::Yellow => self.yellow,
        }
    }
}

impl Signature {
    fn matches(&self, s: &Signals) -> bool {
        self.brown.contains(s.brown)
            && self.spot.contains(s.spot)
            && self.yellow.contains(s.yellow)
            && (!self.irregular_texture || !s.uniform)
    }

    fn threshold(&self) -> f64 {
        self.band(self.strength).above.unwrap_or(0.0)
    }

    fn confidence(&self, s: &Signals) -> f64 {
        let (lo, hi) = self.confidence;
        let excess = s.get(self.strength) - self.threshold();
        round2((lo + excess * self.gain).clamp(lo, hi))
    }

    fn severity(&self, s: &Signals) -> Severity {
        let value = s.get(self.strength);
        match (self.high_above, self.medium_above) {
            (Some(high), _) if value > high => Severity::High,
            (_, Some(medium)) if value > medium => Severity::Medium,
            _ => Severity::Low,
        }
    }
}

impl RuleEngine {
    /// Create a rule engine with the given thresholds and cascade mode.
    pub fn new(thresholds: Thresholds, mode: ClassifierMode) -> Self {
        Self { thresholds, mode }
    }

    pub fn mode(&self) -> ClassifierMode {
        self.mode
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Classify a set of profiles.
    pub fn classify_profiles(&self, profiles: &Profiles) -> Classification {
        self.classify(&profiles.color, &profiles.spot, &profiles.texture)
    }

    /// Run the guard cascade. Total over well-formed profiles.
    pub fn classify(
        &self,
        color: &ColorProfile,
        spot: &SpotProfile,
        texture: &TextureProfile,
    ) -> Classification {
        let signals = Signals::new(color, spot, texture);

        if self.is_healthy(color, &signals) {
            return Classification {
                category: Category::Healthy,
                confidence: self.healthy_confidence(&signals),
                severity: Severity::None,
            };
        }

        let severity = self.diseased_severity(&signals);

        if self.mode == ClassifierMode::Detailed {
            let signatures = &self.thresholds.signatures;
            if let Some(sig) = signatures.iter().find(|sig| sig.matches(&signals)) {
                debug!("Matched disease signature: {}", sig.category);
                // Highest tier of the composite and every matching signature
                let severity = signatures
                    .iter()
                    .filter(|other| other.matches(&signals))
                    .map(|other| other.severity(&signals))
                    .fold(severity, Severity::max);
                return Classification {
                    category: sig.category,
                    confidence: sig.confidence(&signals),
                    severity,
                };
            }
        }

        Classification {
            category: Category::Diseased,
            confidence: self.diseased_confidence(color, &signals),
            severity,
        }
    }

    fn is_healthy(&self, color: &ColorProfile, s: &Signals) -> bool {
        let h = &self.thresholds.healthy;
        s.green > h.min_green_pct
            && color.discoloration_score() < h.max_discoloration
            && s.spot < h.max_spot_pct
            && color.health_score > h.min_health_score
    }

    fn healthy_confidence(&self, s: &Signals) -> f64 {
        let h = &self.thresholds.healthy;
        let base = (h.confidence_base + s.green / 2.0).min(h.confidence_ceiling);
        let penalty = (s.brown + s.yellow + s.spot) * h.confidence_penalty;
        let confidence = (base - penalty)
            .max(h.confidence_floor)
            .clamp(h.confidence_floor, h.confidence_ceiling);
        round2(confidence)
    }

    fn diseased_confidence(&self, color: &ColorProfile, s: &Signals) -> f64 {
        let d = &self.thresholds.diseased;
        let mut confidence = d.confidence_base;
        if color.discoloration_score() > d.discoloration_bonus_above {
            confidence += d.discoloration_bonus;
        }
        if s.spot > d.spot_bonus_above {
            confidence += d.spot_bonus;
        }
        if s.green < d.low_green_bonus_below {
            confidence += d.low_green_bonus;
        }
        round2(confidence.min(d.confidence_ceiling))
    }

    fn diseased_severity(&self, s: &Signals) -> Severity {
        let t = &self.thresholds.severity;
        let score = severity_score(s.brown, s.yellow, s.spot);
        if score > t.high_score || s.green < t.high_green_below {
            Severity::High
        } else if score > t.medium_score || s.brown > t.medium_brown {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

/// Weighted damage composite used for diseased severity.
pub fn severity_score(brown_pct: f64, yellow_pct: f64, spot_pct: f64) -> f64 {
    brown_pct * 1.5 + yellow_pct + spot_pct * 0.8
}
