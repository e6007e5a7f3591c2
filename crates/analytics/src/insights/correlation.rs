use super::{Insight, InsightEngine, InsightSeverity, InsightType};
use crate::series::DataSeries;
use crate::stats;

impl InsightEngine {
    /// Pearson correlation for every unordered pair of series, truncated to
    /// the shorter of the two. Only strong relationships are reported.
    pub fn analyze_correlations(&self, series: &[DataSeries]) -> Vec<Insight> {
        let t = &self.config.correlation;
        let values: Vec<Vec<f64>> = series.iter().map(DataSeries::values).collect();
        let mut insights = Vec::new();

        for i in 0..series.len() {
            for j in (i + 1)..series.len() {
                let n = values[i].len().min(values[j].len());
                if n < t.min_points {
                    continue;
                }

                let r = stats::pearson(&values[i][..n], &values[j][..n]);
                let strong = r.abs() > t.report;
                if !strong {
                    continue;
                }

                let strength = if r.abs() > t.very_strong { "very strong" } else { "strong" };
                let sign = if r > 0.0 { "positive" } else { "negative" };
                let (a, b) = (&series[i].name, &series[j].name);

                insights.push(
                    Insight::new(
                        InsightType::Correlation,
                        InsightSeverity::Info,
                        format!("{} {} correlation between {} and {}", capitalize(strength), sign, a, b),
                        format!(
                            "{} and {} move {} (r = {:.2} over {} points).",
                            a,
                            b,
                            if r > 0.0 { "together" } else { "in opposite directions" },
                            r,
                            n
                        ),
                    )
                    .with_data("series_a", a.clone())
                    .with_data("series_b", b.clone())
                    .with_data("correlation", r)
                    .with_data("points", n)
                    .with_data("strength", strength),
                );
            }
        }

        insights
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
