use serde::{Deserialize, Serialize};

use tally_rules::insight_config::TrendThresholds;

use super::{Insight, InsightEngine, InsightSeverity, InsightType};
use crate::series::DataSeries;
use crate::stats;

/// Direction of a fitted trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    Volatile,
}

/// How a trend direction is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendPresentation {
    pub severity: InsightSeverity,
    pub headline: &'static str,
    pub phrase: &'static str,
}

impl TrendDirection {
    pub fn presentation(self) -> TrendPresentation {
        let (severity, headline, phrase) = match self {
            TrendDirection::Increasing => (InsightSeverity::Positive, "upward trend", "is trending upward"),
            TrendDirection::Decreasing => (InsightSeverity::Warning, "downward trend", "is trending downward"),
            TrendDirection::Volatile => (InsightSeverity::Critical, "volatile trend", "moves erratically"),
            TrendDirection::Stable => (InsightSeverity::Info, "stable", "is holding steady"),
        };
        TrendPresentation {
            severity,
            headline,
            phrase,
        }
    }
}

/// Least-squares fit of a series against its point index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub direction: TrendDirection,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// R² × 100.
    pub confidence: f64,
    pub coefficient_of_variation: f64,
}

impl TrendAnalysis {
    /// Neutral result for series too short to fit.
    pub fn neutral() -> Self {
        Self {
            direction: TrendDirection::Stable,
            slope: 0.0,
            intercept: 0.0,
            r_squared: 0.0,
            confidence: 0.0,
            coefficient_of_variation: 0.0,
        }
    }
}

/// Fit `values` against `0..n` and classify the slope.
pub fn fit(values: &[f64], thresholds: &TrendThresholds) -> TrendAnalysis {
    let n = values.len();
    if n < thresholds.min_points.max(2) {
        return TrendAnalysis::neutral();
    }

    let nf = n as f64;
    let (mut sx, mut sy, mut sxy, mut sxx) = (0.0, 0.0, 0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let x = i as f64;
        sx += x;
        sy += y;
        sxy += x * y;
        sxx += x * x;
    }

    let denominator = nf * sxx - sx * sx;
    let slope = if denominator.abs() <= f64::EPSILON {
        0.0
    } else {
        (nf * sxy - sx * sy) / denominator
    };
    let intercept = (sy - slope * sx) / nf;

    let mean = sy / nf;
    let (mut ss_total, mut ss_residual) = (0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let predicted = intercept + slope * i as f64;
        ss_total += (y - mean).powi(2);
        ss_residual += (y - predicted).powi(2);
    }
    let r_squared = if ss_total <= f64::EPSILON {
        0.0
    } else {
        (1.0 - ss_residual / ss_total).clamp(0.0, 1.0)
    };

    if !slope.is_finite() || !r_squared.is_finite() {
        return TrendAnalysis::neutral();
    }

    let cv = stats::coefficient_of_variation(values);
    let mut direction = if slope.abs() < thresholds.stable_slope {
        TrendDirection::Stable
    } else if slope > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };
    if cv > thresholds.volatile_cv {
        direction = TrendDirection::Volatile;
    }

    TrendAnalysis {
        direction,
        slope,
        intercept,
        r_squared,
        confidence: r_squared * 100.0,
        coefficient_of_variation: cv,
    }
}

impl InsightEngine {
    pub fn analyze_trend(&self, series: &DataSeries) -> TrendAnalysis {
        fit(&series.values(), &self.config.trend)
    }

    /// Trend insight, emitted only when the fit is confident enough.
    pub fn trend_insight(&self, series: &DataSeries) -> Option<Insight> {
        let analysis = self.analyze_trend(series);
        let confident = analysis.confidence >= self.config.trend.min_confidence;
        if series.len() < self.config.trend.min_points || !confident {
            return None;
        }

        let p = analysis.direction.presentation();
        Some(
            Insight::new(
                InsightType::Trend,
                p.severity,
                format!("{}: {}", series.name, p.headline),
                format!(
                    "{} {} ({:+.2} per point, confidence {:.0}%).",
                    series.name, p.phrase, analysis.slope, analysis.confidence
                ),
            )
            .with_data("series", series.name.clone())
            .with_data("direction", format!("{:?}", analysis.direction))
            .with_data("slope", analysis.slope)
            .with_data("intercept", analysis.intercept)
            .with_data("r_squared", analysis.r_squared)
            .with_data("confidence", analysis.confidence),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(values: &[f64]) -> TrendAnalysis {
        fit(values, &TrendThresholds::default())
    }

    #[test]
    fn short_series_are_neutral() {
        for values in [&[][..], &[1.0][..], &[1.0, 50.0][..]] {
            let a = analyze(values);
            assert_eq!(a.direction, TrendDirection::Stable);
            assert_eq!(a.slope, 0.0);
            assert_eq!(a.confidence, 0.0);
        }
    }

    #[test]
    fn rising_series_is_increasing() {
        let values: Vec<f64> = (0..10).map(|i| 100.0 + 2.0 * i as f64).collect();
        let a = analyze(&values);
        assert_eq!(a.direction, TrendDirection::Increasing);
        assert!((a.slope - 2.0).abs() < 1e-9);
        assert!((a.intercept - 100.0).abs() < 1e-9);
        assert!((a.confidence - 100.0).abs() < 1e-6);
    }

    #[test]
    fn falling_series_is_decreasing() {
        let values: Vec<f64> = (0..10).map(|i| 100.0 - 3.0 * i as f64).collect();
        let a = analyze(&values);
        assert_eq!(a.direction, TrendDirection::Decreasing);
        assert!(a.slope < 0.0);
    }

    #[test]
    fn flat_series_is_stable_with_zero_confidence() {
        let a = analyze(&[5.0; 8]);
        assert_eq!(a.direction, TrendDirection::Stable);
        assert_eq!(a.r_squared, 0.0);
    }

    #[test]
    fn tiny_slope_is_stable() {
        let values: Vec<f64> = (0..10).map(|i| 50.0 + 0.001 * i as f64).collect();
        assert_eq!(analyze(&values).direction, TrendDirection::Stable);
    }

    #[test]
    fn high_dispersion_overrides_to_volatile() {
        let a = analyze(&[1.0, 20.0, 2.0, 30.0, 1.0, 40.0]);
        assert_eq!(a.direction, TrendDirection::Volatile);
    }

    #[test]
    fn steep_ramp_from_one_reads_as_volatile() {
        // 1..=10 has CV ~0.52, so dispersion wins over the clean rise.
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let a = analyze(&values);
        assert_eq!(a.direction, TrendDirection::Volatile);
        assert!((a.slope - 1.0).abs() < 1e-9);
    }

    #[test]
    fn overflowing_values_fall_back_to_neutral() {
        let a = analyze(&[1e308, -1e308, 1e308, -1e308]);
        assert_eq!(a, TrendAnalysis::neutral());
        let series = DataSeries::from_values("a", &[1e308, -1e308, 1e308, -1e308]);
        assert!(InsightEngine::new().trend_insight(&series).is_none());
    }

    #[test]
    fn presentation_table() {
        assert_eq!(TrendDirection::Increasing.presentation().severity, InsightSeverity::Positive);
        assert_eq!(TrendDirection::Decreasing.presentation().severity, InsightSeverity::Warning);
        assert_eq!(TrendDirection::Volatile.presentation().severity, InsightSeverity::Critical);
        assert_eq!(TrendDirection::Stable.presentation().severity, InsightSeverity::Info);
    }

    #[test]
    fn low_confidence_fit_emits_no_insight() {
        // Zig-zag around a flat line: R² is near zero.
        let series = DataSeries::from_values("noise", &[10.0, 12.0, 10.0, 12.0, 10.0, 12.0, 10.0]);
        assert!(InsightEngine::new().trend_insight(&series).is_none());
    }

    #[test]
    fn confident_fit_emits_insight() {
        let series = DataSeries::from_values("revenue", &[100.0, 104.0, 108.0, 112.0, 116.0]);
        let insight = InsightEngine::new().trend_insight(&series).unwrap();
        assert_eq!(insight.insight_type, InsightType::Trend);
        assert_eq!(insight.severity, InsightSeverity::Positive);
        assert_eq!(insight.data["direction"], "Increasing");
        assert!(insight.title.starts_with("revenue"));
    }
}
