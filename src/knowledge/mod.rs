//! Static diagnosis text keyed by category.
//!
//! Loaded once at startup from TOML (embedded default or a replacement
//! file), validated against the categories the classifier can emit, and
//! read-only afterwards.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;
use crate::rules::{Category, ClassifierMode};

/// Default knowledge base embedded in the binary at compile time.
const DEFAULT_KNOWLEDGE_BASE: &str = include_str!("../../config/knowledge_base.toml");

/// Human-readable text for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Display name (e.g., "Early Blight")
    pub name: String,
    pub description: String,
    pub treatment: String,
    pub prevention: String,
}

/// Root TOML document.
#[derive(Debug, Deserialize)]
struct KnowledgeFile {
    categories: HashMap<String, KnowledgeEntry>,
}

/// Category -> text mapping with a mandatory `healthy` fallback.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: BTreeMap<Category, KnowledgeEntry>,
    fallback: KnowledgeEntry,
}

impl KnowledgeBase {
    /// Parse a TOML document. Fails when the `healthy` entry is missing;
    /// entries with unrecognized labels are skipped with a warning.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let file: KnowledgeFile = toml::from_str(content)?;

        let mut entries = BTreeMap::new();
        for (label, entry) in file.categories {
            match Category::from_label(&label) {
                Some(category) => {
                    entries.insert(category, entry);
                }
                None => warn!("Ignoring knowledge base entry for unknown category '{}'", label),
            }
        }

        let fallback = entries
            .get(&Category::Healthy)
            .cloned()
            .ok_or_else(|| ConfigError::MissingCategory(Category::Healthy.to_string()))?;

        Ok(Self { entries, fallback })
    }

    /// Check that every category `mode` can produce has its own entry.
    pub fn validate(&self, mode: ClassifierMode) -> Result<(), ConfigError> {
        for category in mode.producible_categories() {
            if !self.entries.contains_key(category) {
                return Err(ConfigError::MissingCategory(category.to_string()));
            }
        }
        Ok(())
    }

    /// Entry for `category`, or the `healthy` entry when none exists.
    pub fn entry(&self, category: Category) -> &KnowledgeEntry {
        self.entries.get(&category).unwrap_or(&self.fallback)
    }

    /// Entry for a free-form label, or the `healthy` entry when the label
    /// is unrecognized.
    pub fn entry_for_label(&self, label: &str) -> &KnowledgeEntry {
        match Category::from_label(label) {
            Some(category) => self.entry(category),
            None => &self.fallback,
        }
    }

    pub fn contains(&self, category: Category) -> bool {
        self.entries.contains_key(&category)
    }

    /// Entries in category order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &KnowledgeEntry)> {
        self.entries.iter().map(|(c, e)| (*c, e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        default_knowledge_base()
    }
}

/// Load a knowledge base from a TOML file.
pub fn load_knowledge_base(path: &Path) -> Result<KnowledgeBase, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    KnowledgeBase::from_toml(&content)
}

/// Get the knowledge base embedded in the binary.
///
/// # Panics
/// Panics if the embedded TOML is invalid (this would be a compile-time bug).
pub fn default_knowledge_base() -> KnowledgeBase {
    KnowledgeBase::from_toml(DEFAULT_KNOWLEDGE_BASE)
        .expect("embedded knowledge_base.toml must be valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[categories.healthy]
name = "Healthy Plant"
description = "Fine."
treatment = "None."
prevention = "Keep going."

[categories.diseased]
name = "Diseased Plant"
description = "Not fine."
treatment = "Treat it."
prevention = "Watch it."
"#;

    #[test]
    fn test_default_covers_every_category() {
        let kb = default_knowledge_base();
        assert_eq!(kb.len(), Category::ALL.len());
        assert!(kb.validate(ClassifierMode::Detailed).is_ok());
        assert!(kb.validate(ClassifierMode::Binary).is_ok());
    }

    #[test]
    fn test_entries_have_text() {
        let kb = default_knowledge_base();
        for (category, entry) in kb.iter() {
            assert!(!entry.name.is_empty(), "{} has no name", category);
            assert!(!entry.description.is_empty(), "{} has no description", category);
            assert!(!entry.treatment.is_empty(), "{} has no treatment", category);
            assert!(!entry.prevention.is_empty(), "{} has no prevention", category);
        }
        assert_eq!(kb.entry(Category::Healthy).name, "Healthy Plant");
        assert_eq!(kb.entry(Category::EarlyBlight).name, "Early Blight");
    }

    #[test]
    fn test_minimal_base_valid_for_binary_only() {
        let kb = KnowledgeBase::from_toml(MINIMAL).unwrap();
        assert!(kb.validate(ClassifierMode::Binary).is_ok());
        let err = kb.validate(ClassifierMode::Detailed).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCategory(_)));
    }

    #[test]
    fn test_missing_category_falls_back_to_healthy() {
        let kb = KnowledgeBase::from_toml(MINIMAL).unwrap();
        assert_eq!(kb.entry(Category::LateBlight).name, "Healthy Plant");
        assert_eq!(kb.entry(Category::Diseased).name, "Diseased Plant");
    }

    #[test]
    fn test_unknown_label_falls_back_to_healthy() {
        let kb = default_knowledge_base();
        assert_eq!(kb.entry_for_label("root_rot").name, "Healthy Plant");
        assert_eq!(kb.entry_for_label("late_blight").name, "Late Blight");
    }

    #[test]
    fn test_healthy_entry_required() {
        let content = r#"
[categories.diseased]
name = "Diseased Plant"
description = "d"
treatment = "t"
prevention = "p"
"#;
        let err = KnowledgeBase::from_toml(content).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCategory(ref c) if c == "healthy"));
    }

    #[test]
    fn test_unknown_entries_skipped() {
        let content = format!(
            "{}\n[categories.root_rot]\nname = \"Root Rot\"\ndescription = \"d\"\ntreatment = \"t\"\nprevention = \"p\"\n",
            MINIMAL
        );
        let kb = KnowledgeBase::from_toml(&content).unwrap();
        assert_eq!(kb.len(), 2);
    }

    #[test]
    fn test_load_knowledge_base_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.toml");
        std::fs::write(&path, MINIMAL).unwrap();
        let kb = load_knowledge_base(&path).unwrap();
        assert!(kb.contains(Category::Diseased));
        assert!(!kb.contains(Category::BacterialSpot));
    }
}
