use super::{Insight, InsightEngine, InsightSeverity, InsightType};
use crate::series::DataSeries;
use crate::stats;

impl InsightEngine {
    /// Coefficient-of-variation volatility, suppressed below the report band.
    pub fn analyze_volatility(&self, series: &DataSeries) -> Option<Insight> {
        let t = &self.config.volatility;
        if series.len() < t.min_points {
            return None;
        }

        let values = series.values();
        let cv = stats::coefficient_of_variation(&values);
        if cv < t.report {
            return None;
        }

        let (severity, level) = if cv > t.critical {
            (InsightSeverity::Critical, "highly volatile")
        } else if cv > t.warning {
            (InsightSeverity::Warning, "moderately volatile")
        } else {
            (InsightSeverity::Info, "somewhat variable")
        };

        Some(
            Insight::new(
                InsightType::Pattern,
                severity,
                format!("{} is {}", series.name, level),
                format!(
                    "Values of {} vary by {:.0}% of their mean.",
                    series.name,
                    cv * 100.0
                ),
            )
            .with_data("series", series.name.clone())
            .with_data("coefficient_of_variation", cv)
            .with_data("std_dev", stats::population_std_dev(&values))
            .with_data("mean", stats::mean(&values)),
        )
    }
}
