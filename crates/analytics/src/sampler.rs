//! LTTB (Largest Triangle Three Buckets) downsampling for chart series.
//!
//! Reduces an oversized series to a bounded point count while keeping its
//! visual shape. The x coordinate of a point is its position in the series,
//! so category and chronological series are treated alike.
//!
//! Reference: Sveinn Steinarsson, "Downsampling Time Series for Visual Representation"

use serde_json::json;
use tracing::debug;

use crate::series::DataSeries;

/// Smallest meaningful target: the two endpoints.
const MIN_TARGET_POINTS: usize = 2;

/// Downsample `series` to at most `target_points` points.
///
/// Returns the series unchanged when it already fits. Otherwise the first
/// and last points are always kept and the interior is split into
/// `target_points - 2` buckets, each contributing the point that forms the
/// largest triangle with the previously selected point and the centroid of
/// the following bucket. The output carries `sampled`, `original_count` and
/// `sampled_count` in its metadata.
pub fn downsample(series: &DataSeries, target_points: usize) -> DataSeries {
    let target = target_points.max(MIN_TARGET_POINTS);
    let data = &series.points;
    let n = data.len();

    if n <= target {
        return series.clone();
    }

    let mut selected = Vec::with_capacity(target);
    selected.push(0);

    let buckets = target - 2;
    if buckets > 0 {
        // Interior points only; first and last are fixed.
        let bucket_size = (n - 2) as f64 / buckets as f64;
        let mut a_index = 0usize;

        for i in 0..buckets {
            let bucket_start = ((i as f64 * bucket_size) + 1.0).floor() as usize;
            // The last bucket always reaches the final interior point; float
            // rounding in `bucket_size` can otherwise stop it one short.
            let bucket_end = if i + 1 == buckets {
                n - 1
            } else {
                let end = (((i + 1) as f64 * bucket_size) + 1.0).floor() as usize;
                end.min(n - 1).max(bucket_start + 1)
            };

            let next_start = bucket_end;
            let next_end = ((((i + 2) as f64 * bucket_size) + 1.0).floor() as usize).min(n);

            // Lookahead anchor: centroid of the next bucket, or the last point.
            let (cx, cy) = if next_end > next_start {
                let count = (next_end - next_start) as f64;
                let (sum_x, sum_y) = (next_start..next_end)
                    .fold((0.0, 0.0), |(sx, sy), j| (sx + j as f64, sy + data[j].value));
                (sum_x / count, sum_y / count)
            } else {
                ((n - 1) as f64, data[n - 1].value)
            };

            let (ax, ay) = (a_index as f64, data[a_index].value);
            let mut max_area = -1.0f64;
            let mut max_index = bucket_start;

            for j in bucket_start..bucket_end {
                let (bx, by) = (j as f64, data[j].value);
                let area = ((ax - cx) * (by - ay) - (ax - bx) * (cy - ay)).abs() / 2.0;
                if area > max_area {
                    max_area = area;
                    max_index = j;
                }
            }

            selected.push(max_index);
            a_index = max_index;
        }
    }

    selected.push(n - 1);

    let points = selected.into_iter().map(|i| data[i].clone()).collect::<Vec<_>>();
    let sampled_count = points.len();

    let mut out = series.clone();
    out.points = points;
    out.metadata.insert("sampled".into(), json!(true));
    out.metadata.insert("original_count".into(), json!(n));
    out.metadata.insert("sampled_count".into(), json!(sampled_count));

    debug!(
        series = %series.name,
        original = n,
        sampled = sampled_count,
        "series downsampled"
    );

    out
}
