//! Classifier configuration.
//!
//! Read once at startup from TOML. Every field is optional; an absent file
//! means "rule-based only, binary mode, embedded thresholds and knowledge
//! base".

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::knowledge::{default_knowledge_base, load_knowledge_base, KnowledgeBase};
use crate::rules::{default_thresholds, load_thresholds, ClassifierMode, Thresholds};

const CONFIG_DIR_NAME: &str = "leafcheck";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub mode: ClassifierMode,
    /// Serialized binary model; the learned path is attempted only when set
    pub model_path: Option<PathBuf>,
    /// Intra-op threads for the model runtime
    pub intra_threads: usize,
    /// Replacement for the embedded thresholds
    pub thresholds_path: Option<PathBuf>,
    /// Replacement for the embedded knowledge base
    pub knowledge_base_path: Option<PathBuf>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            mode: ClassifierMode::Binary,
            model_path: None,
            intra_threads: 4,
            thresholds_path: None,
            knowledge_base_path: None,
        }
    }
}

impl ClassifierConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read a config file. Relative paths inside it resolve against the
    /// file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut config = Self::from_toml(&content)?;

        if let Some(base) = path.parent() {
            config.model_path = config.model_path.map(|p| resolve(base, p));
            config.thresholds_path = config.thresholds_path.map(|p| resolve(base, p));
            config.knowledge_base_path = config.knowledge_base_path.map(|p| resolve(base, p));
        }

        debug!("Loaded classifier config from {}", path.display());
        Ok(config)
    }

    /// `<config dir>/leafcheck/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the file at `default_path()` when it exists, otherwise defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// The configured threshold file, or the embedded thresholds.
    pub fn thresholds(&self) -> Result<Thresholds, ConfigError> {
        match &self.thresholds_path {
            Some(path) => load_thresholds(path),
            None => Ok(default_thresholds()),
        }
    }

    /// The configured knowledge base file, or the embedded one.
    pub fn knowledge_base(&self) -> Result<KnowledgeBase, ConfigError> {
        match &self.knowledge_base_path {
            Some(path) => load_knowledge_base(path),
            None => Ok(default_knowledge_base()),
        }
    }
}

fn resolve(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_relative() {
        base.join(path)
    } else {
        path
    }
}
