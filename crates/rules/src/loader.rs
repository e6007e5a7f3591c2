//! Filesystem loading for InsightConfig documents.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::error::Result;
use crate::insight_config::{CompiledInsightConfig, InsightConfigRule};

/// Parse and validate an InsightConfig document from YAML text.
pub fn parse_insight_config(yaml: &str) -> Result<InsightConfigRule> {
    let rule: InsightConfigRule = serde_yaml::from_str(yaml)?;
    rule.validate()?;
    Ok(rule)
}

/// Read, validate and compile an InsightConfig document from disk.
pub fn load_insight_config(path: &Path) -> Result<CompiledInsightConfig> {
    let yaml = fs::read_to_string(path)?;
    let rule = parse_insight_config(&yaml)?;
    if !rule.metadata.enabled {
        warn!(rule_id = %rule.metadata.id, path = %path.display(), "insight config disabled; using defaults");
        return Ok(CompiledInsightConfig::default());
    }
    info!(rule_id = %rule.metadata.id, path = %path.display(), "loaded insight config");
    Ok(rule.compile())
}
