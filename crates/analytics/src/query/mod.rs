//! Query execution: filter, cap, build series, downsample, analyze.
//!
//! Each stage is a plain function over its input so the pipeline can be
//! read top to bottom in [`QueryEngine::execute_with_progress`]. The engine
//! itself only holds the accessor table and the insight thresholds; nothing
//! is cached between calls.

pub mod aggregate;
pub mod builder;
pub mod filter;
pub mod progress;
pub mod types;

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};

use tally_core::{ClientRecord, Config, TallyError};

use crate::accessor::FieldAccessors;
use crate::catalog::{FieldCatalog, FieldDefinitionSource};
use crate::error::AnalyticsError;
use crate::insights::InsightEngine;
use crate::result::AnalyticsResult;
use crate::sampler;
use crate::series::palette_color;

pub use aggregate::aggregate;
pub use builder::{QueryMode, MISSING_GROUP};
pub use filter::{matches_all, FilterOperator, FilterRule};
pub use progress::Progress;
pub use types::{AggregationFunction, OrderBy, QueryConfiguration, SelectedField, SortDirection};

/// Smallest chart budget that still leaves LTTB an interior bucket.
pub const MIN_CHART_POINTS: usize = 3;

/// Supplier of client records for [`QueryEngine::run`].
pub trait RecordSource {
    fn load_records(&self) -> Result<Vec<ClientRecord>, TallyError>;
}

impl RecordSource for Vec<ClientRecord> {
    fn load_records(&self) -> Result<Vec<ClientRecord>, TallyError> {
        Ok(self.clone())
    }
}

/// Executes [`QueryConfiguration`]s against client records.
#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    accessors: FieldAccessors,
    insights: InsightEngine,
}

impl QueryEngine {
    /// Engine over the native fields plus the active definitions of `definitions`.
    pub fn new(definitions: &dyn FieldDefinitionSource) -> Self {
        Self {
            accessors: FieldAccessors::from_catalog(&FieldCatalog::new(definitions)),
            insights: InsightEngine::new(),
        }
    }

    /// Engine whose insight thresholds come from the configured rule file,
    /// or the built-in defaults when none is set.
    pub fn from_config(
        config: &Config,
        definitions: &dyn FieldDefinitionSource,
    ) -> Result<Self, AnalyticsError> {
        config.log_summary();
        let engine = Self::new(definitions);
        match &config.analytics.insight_config_path {
            Some(path) => {
                let thresholds = tally_rules::load_insight_config(path)?;
                Ok(engine.with_insight_engine(InsightEngine::with_config(thresholds)))
            }
            None => Ok(engine),
        }
    }

    pub fn with_insight_engine(mut self, insights: InsightEngine) -> Self {
        self.insights = insights;
        self
    }

    pub fn accessors(&self) -> &FieldAccessors {
        &self.accessors
    }

    pub fn insight_engine(&self) -> &InsightEngine {
        &self.insights
    }

    /// Load records from `source`, then execute `config` over them.
    pub fn run(
        &self,
        source: &dyn RecordSource,
        config: &QueryConfiguration,
        mut progress: Progress<'_>,
    ) -> Result<AnalyticsResult, AnalyticsError> {
        validate(config)?;

        progress.report(5, "Connecting to record source");
        let records = source.load_records().map_err(|e| AnalyticsError::Source {
            context: "failed to load client records".into(),
            source: e,
        })?;
        progress.report(20, "Records loaded");
        debug!(records = records.len(), "loaded client records");

        self.execute_with_progress(records, config, progress)
    }

    pub fn execute(
        &self,
        records: Vec<ClientRecord>,
        config: &QueryConfiguration,
    ) -> Result<AnalyticsResult, AnalyticsError> {
        self.execute_with_progress(records, config, Progress::none())
    }

    pub fn execute_with_progress(
        &self,
        mut records: Vec<ClientRecord>,
        config: &QueryConfiguration,
        mut progress: Progress<'_>,
    ) -> Result<AnalyticsResult, AnalyticsError> {
        validate(config)?;
        let start = Instant::now();
        let mode = QueryMode::for_config(config);
        let records_total = records.len();

        let unknown = self.unknown_fields(config);
        if !unknown.is_empty() {
            warn!(fields = ?unknown, "query references unknown fields; they resolve to null");
        }

        records.retain(|r| matches_all(r, &config.filters, &self.accessors));
        let records_filtered = records.len();
        debug!(
            total = records_total,
            matched = records_filtered,
            rules = config.filters.len(),
            "filters applied"
        );
        progress.report(40, "Filters applied");

        let cap_applied = match config.max_records {
            Some(max) if records.len() > max => {
                records.truncate(max);
                info!(before = records_filtered, cap = max, "record cap applied");
                true
            }
            _ => false,
        };

        let mut series = match &config.group_by {
            Some(group_field) => {
                builder::build_grouped(&records, config, group_field, &self.accessors)
            }
            None => builder::build_individual(&records, config, &self.accessors),
        };
        progress.report(60, "Series built");

        let mut sampled_series = 0usize;
        if mode == QueryMode::Individual {
            for s in series.iter_mut() {
                if s.len() > config.max_chart_points {
                    *s = sampler::downsample(s, config.max_chart_points);
                    sampled_series += 1;
                }
            }
        }
        for (i, s) in series.iter_mut().enumerate() {
            s.color = palette_color(i).to_string();
        }
        progress.report(75, "Series sampled");

        let insights = if config.include_insights {
            self.insights.generate_insights(&series)
        } else {
            Vec::new()
        };
        progress.report(90, "Insights generated");

        let mut metadata = BTreeMap::new();
        metadata.insert("mode".to_string(), json!(mode.as_str()));
        metadata.insert("records_total".to_string(), json!(records_total));
        metadata.insert("records_before_cap".to_string(), json!(records_filtered));
        metadata.insert("record_cap_applied".to_string(), json!(cap_applied));
        metadata.insert("max_records".to_string(), json!(config.max_records));
        metadata.insert("max_chart_points".to_string(), json!(config.max_chart_points));
        metadata.insert("sampled_series".to_string(), json!(sampled_series));
        if let Some(group_field) = &config.group_by {
            metadata.insert("group_by".to_string(), json!(group_field));
        }
        if !unknown.is_empty() {
            metadata.insert("unknown_fields".to_string(), json!(unknown));
        }

        let result = AnalyticsResult {
            series,
            insights,
            records_analyzed: records.len(),
            duration: start.elapsed(),
            metadata,
            generated_at: Utc::now(),
        };

        info!(
            mode = mode.as_str(),
            records = result.records_analyzed,
            series = result.series.len(),
            points = result.total_points(),
            insights = result.insights.len(),
            elapsed_ms = result.duration.as_millis() as u64,
            "query complete"
        );
        progress.report(100, "Done");

        Ok(result)
    }
}

impl QueryEngine {
    /// Field names the query mentions that the accessor table cannot
    /// resolve, deduplicated in first-mention order.
    fn unknown_fields<'c>(&self, config: &'c QueryConfiguration) -> Vec<&'c str> {
        let mentioned = config
            .fields
            .iter()
            .map(|f| f.field.as_str())
            .chain(config.filters.iter().map(|r| r.field_name.as_str()))
            .chain(config.group_by.as_deref())
            .chain(config.order_by.as_ref().map(|o| o.field.as_str()));

        let mut unknown: Vec<&str> = Vec::new();
        for field in mentioned {
            if !self.accessors.contains(field) && !unknown.contains(&field) {
                unknown.push(field);
            }
        }
        unknown
    }
}

fn validate(config: &QueryConfiguration) -> Result<(), AnalyticsError> {
    if config.fields.is_empty() {
        return Err(AnalyticsError::InvalidQuery(
            "at least one field must be selected".into(),
        ));
    }
    if config.max_chart_points < MIN_CHART_POINTS {
        return Err(AnalyticsError::InvalidQuery(format!(
            "max_chart_points must be at least {}, got {}",
            MIN_CHART_POINTS, config.max_chart_points
        )));
    }
    Ok(())
}
