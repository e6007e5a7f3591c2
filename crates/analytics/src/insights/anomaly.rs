use super::{Insight, InsightEngine, InsightSeverity, InsightType};
use crate::series::DataSeries;
use crate::stats;

impl InsightEngine {
    /// Flag every point further than `sigma × std` from the series mean.
    ///
    /// Series shorter than the configured minimum and zero-variance series
    /// produce nothing.
    pub fn detect_anomalies(&self, series: &DataSeries) -> Vec<Insight> {
        let t = &self.config.anomaly;
        if series.len() < t.min_points {
            return Vec::new();
        }

        let values = series.values();
        let mean = stats::mean(&values);
        let std_dev = stats::population_std_dev(&values);
        if std_dev <= f64::EPSILON {
            return Vec::new();
        }

        series
            .points
            .iter()
            .enumerate()
            .map(|(index, p)| (index, p, (p.value - mean) / std_dev))
            .filter(|(_, _, deviation)| deviation.abs() > t.sigma)
            .map(|(index, p, deviation)| {
                let severity = if deviation.abs() > t.critical_z {
                    InsightSeverity::Critical
                } else {
                    InsightSeverity::Warning
                };
                let side = if deviation > 0.0 { "above" } else { "below" };

                Insight::new(
                    InsightType::Anomaly,
                    severity,
                    format!("Unusual value in {}: {}", series.name, p.label),
                    format!(
                        "{} = {:.2} is {:.1} standard deviations {} the mean of {:.2}.",
                        p.label,
                        p.value,
                        deviation.abs(),
                        side,
                        mean
                    ),
                )
                .with_data("series", series.name.clone())
                .with_data("label", p.label.clone())
                .with_data("index", index)
                .with_data("value", p.value)
                .with_data("mean", mean)
                .with_data("std_dev", std_dev)
                .with_data("deviation", deviation)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_rules::CompiledInsightConfig;

    fn deviation(insight: &Insight) -> f64 {
        insight.data["deviation"].as_f64().unwrap()
    }

    #[test]
    fn deviation_is_measured_in_population_sigmas() {
        // Nine zeros and a ten: mean 1, population std 3, so the ten sits
        // exactly three sigmas out and stays below the critical cutoff.
        let mut values = vec![0.0; 9];
        values.push(10.0);
        let series = DataSeries::from_values("s", &values);
        let found = InsightEngine::new().detect_anomalies(&series);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].data["mean"], 1.0);
        assert_eq!(found[0].data["std_dev"], 3.0);
        assert_eq!(deviation(&found[0]), 3.0);
        assert_eq!(found[0].severity, InsightSeverity::Warning);
    }

    #[test]
    fn uniform_ramp_has_no_anomalies() {
        let series = DataSeries::from_values("s", &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(InsightEngine::new().detect_anomalies(&series).is_empty());
    }

    #[test]
    fn too_few_points_are_ignored() {
        let series = DataSeries::from_values("s", &[1.0, 1.0, 1.0, 900.0]);
        assert!(InsightEngine::new().detect_anomalies(&series).is_empty());
    }

    #[test]
    fn constant_series_has_no_anomalies() {
        let series = DataSeries::from_values("s", &[3.0; 12]);
        assert!(InsightEngine::new().detect_anomalies(&series).is_empty());
    }

    #[test]
    fn spike_is_flagged_with_positive_deviation() {
        let series = DataSeries::from_values("s", &[1.0, 2.0, 3.0, 4.0, 2.0, 3.0, 1.0, 100.0]);
        let found = InsightEngine::new().detect_anomalies(&series);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].data["label"], "7");
        assert!(deviation(&found[0]) > 0.0);
        assert_eq!(found[0].insight_type, InsightType::Anomaly);
    }

    #[test]
    fn five_point_spike_needs_a_lower_sigma() {
        // With five samples no point can exceed two population standard
        // deviations (the bound is exactly 2), so the default stays quiet.
        let series = DataSeries::from_values("s", &[1.0, 2.0, 3.0, 4.0, 100.0]);
        assert!(InsightEngine::new().detect_anomalies(&series).is_empty());

        let mut config = CompiledInsightConfig::default();
        config.anomaly.sigma = 1.5;
        let found = InsightEngine::with_config(config).detect_anomalies(&series);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].data["value"], 100.0);
        assert!(deviation(&found[0]) > 0.0);
    }

    #[test]
    fn severity_escalates_past_three_sigma() {
        let mut values = vec![10.0; 30];
        values[5] = 11.0;
        values[12] = 9.0;
        values[20] = 60.0;
        let series = DataSeries::from_values("s", &values);
        let found = InsightEngine::new().detect_anomalies(&series);
        let spike = found.iter().find(|i| i.data["label"] == "20").unwrap();
        assert_eq!(spike.severity, InsightSeverity::Critical);
        assert!(deviation(spike) > 3.0);
    }

    #[test]
    fn negative_outlier_reports_negative_deviation() {
        let mut values = vec![50.0, 51.0, 49.0, 50.0, 52.0, 48.0, 50.0, 51.0, 49.0];
        values.push(0.0);
        let series = DataSeries::from_values("s", &values);
        let found = InsightEngine::new().detect_anomalies(&series);
        assert_eq!(found.len(), 1);
        assert!(deviation(&found[0]) < 0.0);
        assert!(found[0].description.contains("below"));
    }
}
