//! Descriptive statistics shared by every insight detector.
//!
//! All functions are total: empty input and zero variance degrade to 0
//! instead of NaN or infinity.

/// Sum of all values.
pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Arithmetic mean, 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    sum(values) / values.len() as f64
}

/// Population standard deviation. Fewer than two samples yield 0.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Median; even counts average the two middle elements. 0 for empty input.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Standard deviation over |mean|; 0 when the mean is 0 or the ratio
/// is not finite.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let mean = mean(values);
    if mean == 0.0 {
        return 0.0;
    }
    let cv = population_std_dev(values) / mean.abs();
    if cv.is_finite() { cv } else { 0.0 }
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Population covariance over the common prefix of `x` and `y`.
pub fn covariance(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }
    let (x, y) = (&x[..n], &y[..n]);
    let (mx, my) = (mean(x), mean(y));
    x.iter()
        .zip(y)
        .map(|(a, b)| (a - mx) * (b - my))
        .sum::<f64>()
        / n as f64
}

/// Spread indistinguishable from rounding noise around `mean`.
fn negligible_spread(std_dev: f64, mean: f64) -> bool {
    std_dev == 0.0 || std_dev <= f64::EPSILON * mean.abs()
}

/// Pearson correlation over the common prefix of `x` and `y`, clamped to
/// [-1, 1]. 0 when either side has no variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    let (x, y) = (&x[..n], &y[..n]);
    let (sx, sy) = (population_std_dev(x), population_std_dev(y));
    if negligible_spread(sx, mean(x)) || negligible_spread(sy, mean(y)) {
        return 0.0;
    }
    let r = covariance(x, y) / (sx * sy);
    // Overflowing sums of squares yield NaN or infinities.
    if !r.is_finite() {
        return 0.0;
    }
    r.clamp(-1.0, 1.0)
}
