//! InsightConfig rule kind: trend, anomaly, volatility and correlation
//! thresholds used by the insight engine.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RuleError};
use crate::metadata::CommonMetadata;

/// Expected value of the `kind` field.
pub const INSIGHT_CONFIG_KIND: &str = "InsightConfig";

// ── YAML-level types ────────────────────────────────────────────────

/// Top-level InsightConfig rule document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct InsightConfigRule {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    #[serde(default)]
    pub spec: InsightConfigSpec,
}

/// The `spec` block of an InsightConfig rule. Every section is
/// optional and falls back to the built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct InsightConfigSpec {
    #[serde(default)]
    pub trend: TrendThresholds,
    #[serde(default)]
    pub anomaly: AnomalyThresholds,
    #[serde(default)]
    pub volatility: VolatilityThresholds,
    #[serde(default)]
    pub correlation: CorrelationThresholds,
}

/// Linear-regression trend classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct TrendThresholds {
    /// Below this many points the trend is reported as neutral.
    pub min_points: usize,
    /// |slope| below this → Stable.
    pub stable_slope: f64,
    /// Coefficient of variation above this → Volatile.
    pub volatile_cv: f64,
    /// Minimum confidence (R² × 100) for a trend insight.
    pub min_confidence: f64,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            min_points: 3,
            stable_slope: 0.01,
            volatile_cv: 0.5,
            min_confidence: 30.0,
        }
    }
}

/// Z-score anomaly detection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct AnomalyThresholds {
    pub min_points: usize,
    /// A point is anomalous when |value − mean| > sigma × std.
    pub sigma: f64,
    /// |z| above this → Critical, otherwise Warning.
    pub critical_z: f64,
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        Self {
            min_points: 5,
            sigma: 2.0,
            critical_z: 3.0,
        }
    }
}

/// Coefficient-of-variation volatility bands (ascending).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct VolatilityThresholds {
    pub min_points: usize,
    /// CV below this → no insight.
    pub report: f64,
    /// CV above this → Warning.
    pub warning: f64,
    /// CV above this → Critical.
    pub critical: f64,
}

impl Default for VolatilityThresholds {
    fn default() -> Self {
        Self {
            min_points: 3,
            report: 0.2,
            warning: 0.3,
            critical: 0.5,
        }
    }
}

/// Pearson correlation reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct CorrelationThresholds {
    pub min_points: usize,
    /// |r| above this is reported.
    pub report: f64,
    /// |r| above this is labeled "very strong".
    pub very_strong: f64,
}

impl Default for CorrelationThresholds {
    fn default() -> Self {
        Self {
            min_points: 3,
            report: 0.7,
            very_strong: 0.9,
        }
    }
}

// ── Compiled type ───────────────────────────────────────────────────

/// Thresholds as consumed by the insight engine. The spec section is
/// already fully typed, so compiling is a copy.
pub type CompiledInsightConfig = InsightConfigSpec;

impl InsightConfigRule {
    /// Check kind and threshold ordering.
    pub fn validate(&self) -> Result<()> {
        if self.kind != INSIGHT_CONFIG_KIND {
            return Err(RuleError::Validation(format!(
                "expected kind {}, got {}",
                INSIGHT_CONFIG_KIND, self.kind
            )));
        }
        self.spec.validate()
    }

    /// Compile the YAML config.
    pub fn compile(&self) -> CompiledInsightConfig {
        self.spec.clone()
    }
}

impl InsightConfigSpec {
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        let t = &self.trend;
        if t.stable_slope < 0.0 {
            problems.push("trend.stable_slope must be >= 0".to_string());
        }
        if t.volatile_cv <= 0.0 {
            problems.push("trend.volatile_cv must be > 0".to_string());
        }
        if !(0.0..=100.0).contains(&t.min_confidence) {
            problems.push("trend.min_confidence must be within 0..=100".to_string());
        }

        let a = &self.anomaly;
        if a.sigma <= 0.0 {
            problems.push("anomaly.sigma must be > 0".to_string());
        }
        if a.critical_z < a.sigma {
            problems.push("anomaly.critical_z must be >= anomaly.sigma".to_string());
        }
        if a.min_points < 2 {
            problems.push("anomaly.min_points must be >= 2".to_string());
        }

        let v = &self.volatility;
        if !(v.report <= v.warning && v.warning <= v.critical) {
            problems.push("volatility bands must ascend: report <= warning <= critical".to_string());
        }

        let c = &self.correlation;
        if !(c.report > 0.0 && c.report <= c.very_strong && c.very_strong <= 1.0) {
            problems.push("correlation bounds must satisfy 0 < report <= very_strong <= 1".to_string());
        }
        if c.min_points < 2 {
            problems.push("correlation.min_points must be >= 2".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(RuleError::Validation(problems.join("; ")))
        }
    }
}
