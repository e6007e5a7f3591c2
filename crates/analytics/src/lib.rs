//! Client analytics: series construction, LTTB downsampling, descriptive
//! statistics and insight generation over CRM client records.

pub mod accessor;
pub mod catalog;
pub mod error;
pub mod indicators;
pub mod insights;
pub mod query;
pub mod result;
pub mod sampler;
pub mod series;
pub mod stats;

pub use accessor::FieldAccessors;
pub use catalog::{FieldCatalog, FieldDefinitionSource, FieldDescriptor, FieldKind};
pub use error::AnalyticsError;
pub use indicators::{
    combine_series, exponential_moving_average, moving_average, relative_strength_index,
    CombineOperation,
};
pub use insights::{
    analyze_trend, generate_insights, Insight, InsightEngine, InsightSeverity, InsightType,
    TrendAnalysis, TrendDirection,
};
pub use query::{
    AggregationFunction, FilterOperator, FilterRule, Progress, QueryConfiguration, QueryEngine,
    RecordSource, SelectedField, SortDirection,
};
pub use result::AnalyticsResult;
pub use sampler::downsample;
pub use series::{DataPoint, DataSeries, SeriesType};
