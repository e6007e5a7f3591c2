use serde::{Deserialize, Serialize};

use tally_core::config::{AnalyticsConfig, DEFAULT_MAX_CHART_POINTS, DEFAULT_MAX_RECORDS};

use super::filter::FilterRule;

/// Reduction applied to a field's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationFunction {
    Count,
    Sum,
    Average,
    Min,
    Max,
    Median,
    StdDev,
}

impl AggregationFunction {
    pub fn label(self) -> &'static str {
        match self {
            AggregationFunction::Count => "Count",
            AggregationFunction::Sum => "Sum",
            AggregationFunction::Average => "Average",
            AggregationFunction::Min => "Min",
            AggregationFunction::Max => "Max",
            AggregationFunction::Median => "Median",
            AggregationFunction::StdDev => "StdDev",
        }
    }
}

/// A selected field, optionally tagged with its own aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedField {
    pub field: String,
    #[serde(default)]
    pub aggregation: Option<AggregationFunction>,
}

impl SelectedField {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            aggregation: None,
        }
    }

    pub fn aggregated(field: impl Into<String>, aggregation: AggregationFunction) -> Self {
        Self {
            field: field.into(),
            aggregation: Some(aggregation),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

/// Everything one query invocation needs to know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfiguration {
    pub fields: Vec<SelectedField>,
    /// Conjunctive: a record must pass every rule.
    #[serde(default)]
    pub filters: Vec<FilterRule>,
    #[serde(default)]
    pub group_by: Option<String>,
    /// Default aggregation for fields without their own.
    #[serde(default)]
    pub aggregation: Option<AggregationFunction>,
    #[serde(default)]
    pub order_by: Option<OrderBy>,
    /// Row limit for individual mode, applied after ordering.
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default = "default_max_records")]
    pub max_records: Option<usize>,
    #[serde(default = "default_max_chart_points")]
    pub max_chart_points: usize,
    #[serde(default = "default_true")]
    pub include_insights: bool,
}

fn default_max_records() -> Option<usize> {
    Some(DEFAULT_MAX_RECORDS)
}

fn default_max_chart_points() -> usize {
    DEFAULT_MAX_CHART_POINTS
}

fn default_true() -> bool {
    true
}

impl Default for QueryConfiguration {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            filters: Vec::new(),
            group_by: None,
            aggregation: None,
            order_by: None,
            limit: None,
            max_records: default_max_records(),
            max_chart_points: default_max_chart_points(),
            include_insights: true,
        }
    }
}

impl QueryConfiguration {
    /// Empty selection carrying the limits of an [`AnalyticsConfig`].
    pub fn with_limits(config: &AnalyticsConfig) -> Self {
        Self {
            max_records: config.max_records,
            max_chart_points: config.max_chart_points,
            include_insights: config.insights_enabled,
            ..Self::default()
        }
    }

    pub fn select(mut self, field: impl Into<String>) -> Self {
        self.fields.push(SelectedField::new(field));
        self
    }

    pub fn select_aggregated(
        mut self,
        field: impl Into<String>,
        aggregation: AggregationFunction,
    ) -> Self {
        self.fields.push(SelectedField::aggregated(field, aggregation));
        self
    }

    pub fn filter(mut self, rule: FilterRule) -> Self {
        self.filters.push(rule);
        self
    }

    pub fn group_by(mut self, field: impl Into<String>) -> Self {
        self.group_by = Some(field.into());
        self
    }

    pub fn aggregate(mut self, aggregation: AggregationFunction) -> Self {
        self.aggregation = Some(aggregation);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn max_records(mut self, max: Option<usize>) -> Self {
        self.max_records = max;
        self
    }

    pub fn max_chart_points(mut self, points: usize) -> Self {
        self.max_chart_points = points;
        self
    }

    pub fn without_insights(mut self) -> Self {
        self.include_insights = false;
        self
    }

    /// Aggregation in effect for a selected field, if any.
    pub fn effective_aggregation(&self, field: &SelectedField) -> Option<AggregationFunction> {
        field.aggregation.or(self.aggregation)
    }
}
