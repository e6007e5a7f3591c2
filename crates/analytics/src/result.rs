use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::insights::{Insight, InsightType};
use crate::series::DataSeries;

/// Output of one query run, ready for a chart renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsResult {
    pub series: Vec<DataSeries>,
    pub insights: Vec<Insight>,
    /// Records that passed filtering and the record cap.
    pub records_analyzed: usize,
    pub duration: Duration,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub generated_at: DateTime<Utc>,
}

impl AnalyticsResult {
    pub fn total_points(&self) -> usize {
        self.series.iter().map(DataSeries::len).sum()
    }

    pub fn insights_of(&self, insight_type: InsightType) -> impl Iterator<Item = &Insight> {
        self.insights
            .iter()
            .filter(move |i| i.insight_type == insight_type)
    }

    /// True when any series was reduced by the sampler.
    pub fn was_sampled(&self) -> bool {
        self.series.iter().any(DataSeries::is_sampled)
    }
}
