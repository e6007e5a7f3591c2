//! Derived series: smoothing and momentum indicators plus element-wise
//! arithmetic between two series. These are auxiliary chart layers, not
//! insights.
//!
//! Each indicator output point reuses the label and timestamp of the input
//! point that closes its window. A period of 0 or one longer than the input
//! yields an empty series.

use serde::{Deserialize, Serialize};

use crate::series::{DataPoint, DataSeries};
use crate::stats;

/// Element-wise operation for [`combine_series`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombineOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl CombineOperation {
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            CombineOperation::Add => a + b,
            CombineOperation::Subtract => a - b,
            CombineOperation::Multiply => a * b,
            CombineOperation::Divide if b == 0.0 => 0.0,
            CombineOperation::Divide => a / b,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            CombineOperation::Add => "+",
            CombineOperation::Subtract => "-",
            CombineOperation::Multiply => "*",
            CombineOperation::Divide => "/",
        }
    }
}

fn valid_period(series: &DataSeries, period: usize) -> bool {
    period > 0 && period <= series.len()
}

fn point_like(source: &DataPoint, value: f64) -> DataPoint {
    DataPoint {
        label: source.label.clone(),
        value,
        timestamp: source.timestamp,
    }
}

/// Simple moving average over a trailing window of `period` points.
pub fn moving_average(series: &DataSeries, period: usize) -> DataSeries {
    let name = format!("{} MA({})", series.name, period);
    if !valid_period(series, period) {
        return series.derive(name, Vec::new());
    }

    let values = series.values();
    let points = values
        .windows(period)
        .enumerate()
        .map(|(i, window)| point_like(&series.points[i + period - 1], stats::mean(window)))
        .collect();

    series.derive(name, points)
}

/// Exponential moving average seeded with the simple average of the first
/// `period` points.
pub fn exponential_moving_average(series: &DataSeries, period: usize) -> DataSeries {
    let name = format!("{} EMA({})", series.name, period);
    if !valid_period(series, period) {
        return series.derive(name, Vec::new());
    }

    let values = series.values();
    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut ema = stats::mean(&values[..period]);

    let mut points = Vec::with_capacity(values.len() - period + 1);
    points.push(point_like(&series.points[period - 1], ema));
    for i in period..values.len() {
        ema = (values[i] - ema) * multiplier + ema;
        points.push(point_like(&series.points[i], ema));
    }

    series.derive(name, points)
}

/// Relative strength index over a trailing window of `period` changes.
///
/// Emits one point per input point from index `period` on. A window with no
/// losses maps to 100.
pub fn relative_strength_index(series: &DataSeries, period: usize) -> DataSeries {
    let name = format!("{} RSI({})", series.name, period);
    if period == 0 || period >= series.len() {
        return series.derive(name, Vec::new());
    }

    let values = series.values();
    let changes: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();

    let points = changes
        .windows(period)
        .enumerate()
        .map(|(i, window)| {
            let gain = window.iter().filter(|c| **c > 0.0).sum::<f64>() / period as f64;
            let loss = window.iter().filter(|c| **c < 0.0).map(|c| -c).sum::<f64>() / period as f64;
            let rsi = if loss == 0.0 {
                100.0
            } else {
                100.0 - 100.0 / (1.0 + gain / loss)
            };
            point_like(&series.points[i + period], rsi)
        })
        .collect();

    series.derive(name, points)
}

/// Element-wise `a op b`, truncated to the shorter series. Division by zero
/// yields 0 for that point. Labels and timestamps come from `a`.
pub fn combine_series(a: &DataSeries, b: &DataSeries, op: CombineOperation) -> DataSeries {
    let name = format!("{} {} {}", a.name, op.symbol(), b.name);
    let points = a
        .points
        .iter()
        .zip(&b.points)
        .map(|(pa, pb)| point_like(pa, op.apply(pa.value, pb.value)))
        .collect();
    a.derive(name, points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> DataSeries {
        DataSeries::from_values("s", values)
    }

    #[test]
    fn moving_average_window() {
        let ma = moving_average(&series(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3);
        assert_eq!(ma.values(), vec![2.0, 3.0, 4.0]);
        assert_eq!(ma.points[0].label, "2");
        assert_eq!(ma.name, "s MA(3)");
    }

    #[test]
    fn invalid_periods_are_empty() {
        let s = series(&[1.0, 2.0, 3.0]);
        assert!(moving_average(&s, 0).is_empty());
        assert!(moving_average(&s, 4).is_empty());
        assert!(exponential_moving_average(&s, 0).is_empty());
        assert!(relative_strength_index(&s, 3).is_empty());
    }

    #[test]
    fn ema_length_and_seed() {
        let values = [2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0];
        let ema = exponential_moving_average(&series(&values), 3);
        assert_eq!(ema.len(), values.len() - 3 + 1);
        assert!((ema.points[0].value - 4.0).abs() < 1e-12);
        // (8 - 4) * 0.5 + 4
        assert!((ema.points[1].value - 6.0).abs() < 1e-12);
    }

    #[test]
    fn ema_with_full_period_is_single_average() {
        let ema = exponential_moving_average(&series(&[1.0, 2.0, 6.0]), 3);
        assert_eq!(ema.values(), vec![3.0]);
    }

    #[test]
    fn rsi_without_losses_is_100() {
        let rsi = relative_strength_index(&series(&[1.0, 2.0, 3.0, 4.0, 5.0]), 2);
        assert_eq!(rsi.len(), 3);
        assert!(rsi.values().iter().all(|v| *v == 100.0));
    }

    #[test]
    fn rsi_balanced_moves_is_50() {
        let rsi = relative_strength_index(&series(&[10.0, 12.0, 10.0, 12.0, 10.0]), 2);
        assert!(rsi.values().iter().all(|v| (*v - 50.0).abs() < 1e-9));
    }

    #[test]
    fn rsi_only_losses_is_zero() {
        let rsi = relative_strength_index(&series(&[5.0, 4.0, 3.0, 2.0]), 3);
        assert_eq!(rsi.values(), vec![0.0]);
    }

    #[test]
    fn combine_truncates_and_guards_division() {
        let a = series(&[10.0, 20.0, 30.0, 40.0]);
        let b = series(&[2.0, 0.0, 5.0]);
        let div = combine_series(&a, &b, CombineOperation::Divide);
        assert_eq!(div.values(), vec![5.0, 0.0, 6.0]);
        assert!(div.values().iter().all(|v| v.is_finite()));

        assert_eq!(combine_series(&a, &b, CombineOperation::Add).values(), vec![12.0, 20.0, 35.0]);
        assert_eq!(combine_series(&a, &b, CombineOperation::Subtract).values(), vec![8.0, 20.0, 25.0]);
        assert_eq!(combine_series(&a, &b, CombineOperation::Multiply).values(), vec![20.0, 0.0, 150.0]);
        assert_eq!(div.name, "s / s");
    }
}
