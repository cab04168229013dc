//! Rule-based leaf classifier.
//!
//! This module turns the three feature profiles into a diagnosis category,
//! a confidence percentage, and a severity tier.
//!
//! # Architecture
//!
//! - **Thresholds**: Loaded from TOML at startup (or embedded defaults)
//! - **Cascade**: Ordered guards, first match wins; healthy is tested first,
//!   the generic diseased verdict is the catch-all
//! - **Modes**: `Binary` (healthy / diseased) or `Detailed` (specific disease
//!   signatures between the healthy test and the catch-all)
//!
//! # Example
//!
//! ```ignore
//! use leafcheck::rules::{default_thresholds, ClassifierMode, RuleEngine};
//!
//! let engine = RuleEngine::new(default_thresholds(), ClassifierMode::Detailed);
//! let verdict = engine.classify(&color, &spot, &texture);
//! println!("{} ({:.1}%, {})", verdict.category, verdict.confidence, verdict.severity);
//! ```

mod engine;
pub mod thresholds;
mod types;

pub use engine::{severity_score, RuleEngine};
pub use thresholds::{default_thresholds, load_thresholds, Thresholds};
pub use types::*;
