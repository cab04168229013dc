//! Plain-text rendering of diagnoses and batch summaries.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

use serde::Serialize;

use crate::diagnosis::Diagnosis;
use crate::rules::Category;

/// Multi-line report for one image.
pub fn format_diagnosis(path: &Path, diagnosis: &Diagnosis) -> String {
    let mut out = String::new();
    let source = if diagnosis.details.ml_powered {
        "learned model"
    } else {
        "rule engine"
    };

    let _ = writeln!(out, "{}", path.display());
    let _ = writeln!(
        out,
        "  Verdict:     {} ({})",
        diagnosis.name, diagnosis.category
    );
    let _ = writeln!(out, "  Confidence:  {:.2}%", diagnosis.confidence);
    let _ = writeln!(out, "  Severity:    {}", diagnosis.severity);
    let _ = writeln!(out, "  Source:      {}", source);

    let color = &diagnosis.details.color;
    let _ = writeln!(
        out,
        "  Color:       green {:.2}%, brown {:.2}%, yellow {:.2}% (health {:.2})",
        color.green_pct, color.brown_pct, color.yellow_pct, color.health_score
    );
    let _ = writeln!(
        out,
        "  Spots:       {:.2}%{}",
        diagnosis.details.spot.spot_pct,
        if diagnosis.details.spot.has_significant_spots {
            " (significant)"
        } else {
            ""
        }
    );
    let _ = writeln!(
        out,
        "  Texture:     variance {:.1} ({})",
        diagnosis.details.texture.variance,
        if diagnosis.details.texture.is_uniform {
            "uniform"
        } else {
            "irregular"
        }
    );
    let _ = writeln!(out, "  About:       {}", diagnosis.description);
    let _ = writeln!(out, "  Treatment:   {}", diagnosis.treatment);
    let _ = writeln!(out, "  Prevention:  {}", diagnosis.prevention);
    out
}

/// Tally of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub analyzed: usize,
    pub failed: usize,
    /// Results produced by the learned predictor
    pub learned: usize,
    pub by_category: BTreeMap<Category, usize>,
}

impl BatchSummary {
    pub fn record(&mut self, diagnosis: &Diagnosis) {
        self.analyzed += 1;
        if diagnosis.details.ml_powered {
            self.learned += 1;
        }
        *self.by_category.entry(diagnosis.category).or_insert(0) += 1;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub fn healthy(&self) -> usize {
        self.by_category
            .get(&Category::Healthy)
            .copied()
            .unwrap_or(0)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Summary: {} analyzed, {} failed, {} from learned model",
            self.analyzed, self.failed, self.learned
        );
        for (category, count) in &self.by_category {
            let _ = writeln!(out, "  {:<20} {}", category.label(), count);
        }
        out
    }
}
