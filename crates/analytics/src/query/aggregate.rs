use crate::stats;

use super::types::AggregationFunction;

/// Reduce `values` with `func`. `Count` reports `record_count`, the number
/// of records in scope, regardless of how many of them had a numeric value.
/// Every other function over an empty slice is 0.
pub fn aggregate(func: AggregationFunction, values: &[f64], record_count: usize) -> f64 {
    match func {
        AggregationFunction::Count => record_count as f64,
        AggregationFunction::Sum => stats::sum(values),
        AggregationFunction::Average => stats::mean(values),
        AggregationFunction::Min => stats::min(values).unwrap_or(0.0),
        AggregationFunction::Max => stats::max(values).unwrap_or(0.0),
        AggregationFunction::Median => stats::median(values),
        AggregationFunction::StdDev => stats::population_std_dev(values),
    }
}
