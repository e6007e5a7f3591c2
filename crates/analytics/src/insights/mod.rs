//! Insight engine.
//!
//! Each detector is a pure function `series → insights`. [`InsightEngine`]
//! holds the thresholds and assembles the detectors in a fixed order:
//!
//! - per series: trend, anomalies, volatility
//! - across series: pairwise correlations (only with more than one series)
//! - finally: one performance summary

pub mod anomaly;
pub mod correlation;
pub mod summary;
pub mod trend;
pub mod volatility;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use tally_rules::CompiledInsightConfig;

use crate::series::DataSeries;

pub use trend::{TrendAnalysis, TrendDirection};

/// Category of an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsightType {
    Trend,
    Anomaly,
    Pattern,
    Correlation,
    /// Reserved; no seasonal decomposition is performed.
    Seasonality,
    Recommendation,
}

/// Severity of an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InsightSeverity {
    Info,
    Positive,
    Warning,
    Critical,
}

/// A human-readable finding about one or more series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub id: String,
    pub insight_type: InsightType,
    pub title: String,
    pub description: String,
    pub severity: InsightSeverity,
    #[serde(default)]
    pub data: BTreeMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl Insight {
    pub fn new(
        insight_type: InsightType,
        severity: InsightSeverity,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            insight_type,
            title: title.into(),
            description: description.into(),
            severity,
            data: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_data(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.to_owned(), value.into());
        self
    }
}

/// Threshold-carrying entry point for all insight detectors.
#[derive(Debug, Clone, Default)]
pub struct InsightEngine {
    config: CompiledInsightConfig,
}

impl InsightEngine {
    /// Engine with the built-in thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine from a compiled `InsightConfig` rule.
    pub fn with_config(config: CompiledInsightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompiledInsightConfig {
        &self.config
    }

    /// Run every detector over `series` in the documented order.
    pub fn generate_insights(&self, series: &[DataSeries]) -> Vec<Insight> {
        let mut insights = Vec::new();

        for s in series {
            insights.extend(self.trend_insight(s));
            insights.extend(self.detect_anomalies(s));
            insights.extend(self.analyze_volatility(s));
        }

        if series.len() > 1 {
            insights.extend(self.analyze_correlations(series));
        }

        insights.extend(summary::performance_summary(series));

        debug!(
            series = series.len(),
            insights = insights.len(),
            "insight generation complete"
        );

        insights
    }
}

/// Trend analysis with the built-in thresholds.
pub fn analyze_trend(series: &DataSeries) -> TrendAnalysis {
    InsightEngine::new().analyze_trend(series)
}

/// Insight generation with the built-in thresholds.
pub fn generate_insights(series: &[DataSeries]) -> Vec<Insight> {
    InsightEngine::new().generate_insights(series)
}
