//! YAML rule documents for analytics tuning.
//!
//! This crate provides:
//! - The `InsightConfig` rule kind holding every insight threshold
//! - Shared rule metadata (`apiVersion` / `kind` / `metadata` envelope)
//! - A filesystem loader with validation

pub mod error;
pub mod insight_config;
pub mod loader;
pub mod metadata;

pub use error::{Result, RuleError};
pub use insight_config::{CompiledInsightConfig, InsightConfigRule, InsightConfigSpec};
pub use loader::{load_insight_config, parse_insight_config};
pub use metadata::CommonMetadata;
