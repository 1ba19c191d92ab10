//! Parallel per-unit analysis and the deterministic merge that follows it.

pub mod config;
pub mod executor;
pub mod stats;

pub use config::{AnalysisConfig, AnalysisConfigBuilder};
pub use executor::{AnalysisExecutor, AnalysisResult, TranslationContext};
pub use stats::AnalysisStats;
