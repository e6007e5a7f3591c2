use super::{Insight, InsightSeverity, InsightType};
use crate::series::DataSeries;
use crate::stats;

/// One insight summarizing every point across `series`; `None` when there
/// are no points at all.
pub fn performance_summary(series: &[DataSeries]) -> Option<Insight> {
    let values: Vec<f64> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.value))
        .collect();

    let (min, max) = (stats::min(&values)?, stats::max(&values)?);
    let average = stats::mean(&values);

    Some(
        Insight::new(
            InsightType::Pattern,
            InsightSeverity::Info,
            "Performance summary",
            format!(
                "{} points across {} series; min {:.2}, max {:.2}, average {:.2}.",
                values.len(),
                series.len(),
                min,
                max,
                average
            ),
        )
        .with_data("total_points", values.len())
        .with_data("series_count", series.len())
        .with_data("min", min)
        .with_data("max", max)
        .with_data("average", average),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suppressed_without_points() {
        assert!(performance_summary(&[]).is_none());
        assert!(performance_summary(&[DataSeries::from_values("e", &[])]).is_none());
    }

    #[test]
    fn aggregates_across_series() {
        let a = DataSeries::from_values("a", &[1.0, 5.0]);
        let b = DataSeries::from_values("b", &[-3.0, 9.0, 3.0]);
        let insight = performance_summary(&[a, b]).unwrap();
        assert_eq!(insight.data["total_points"], 5);
        assert_eq!(insight.data["series_count"], 2);
        assert_eq!(insight.data["min"], -3.0);
        assert_eq!(insight.data["max"], 9.0);
        assert_eq!(insight.data["average"], 3.0);
    }
}
