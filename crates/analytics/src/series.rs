use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Chart colors assigned to series in production order.
const PALETTE: [&str; 8] = [
    "#4E79A7", "#F28E2B", "#E15759", "#76B7B2", "#59A14F", "#EDC948", "#B07AA1", "#FF9DA7",
];

/// Pick the palette color for the `index`-th series of a result.
pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// A single labeled value of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl DataPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            timestamp: None,
        }
    }

    pub fn at(label: impl Into<String>, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            label: label.into(),
            value,
            timestamp: Some(timestamp),
        }
    }
}

/// How a renderer should draw a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesType {
    Line,
    Bar,
    Area,
    Scatter,
}

/// An ordered, labeled numeric series. Points keep the order they were
/// produced in (chronological or category order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSeries {
    pub name: String,
    pub source_field: String,
    pub series_type: SeriesType,
    pub color: String,
    pub points: Vec<DataPoint>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl DataSeries {
    pub fn new(
        name: impl Into<String>,
        source_field: impl Into<String>,
        series_type: SeriesType,
    ) -> Self {
        Self {
            name: name.into(),
            source_field: source_field.into(),
            series_type,
            color: palette_color(0).to_string(),
            points: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Build a line series straight from values, labeled by position.
    pub fn from_values(name: impl Into<String>, values: &[f64]) -> Self {
        let name = name.into();
        let mut series = Self::new(name.clone(), name, SeriesType::Line);
        series.points = values
            .iter()
            .enumerate()
            .map(|(i, v)| DataPoint::new(i.to_string(), *v))
            .collect();
        series
    }

    pub fn with_points(mut self, points: Vec<DataPoint>) -> Self {
        self.points = points;
        self
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the adaptive sampler reduced this series.
    pub fn is_sampled(&self) -> bool {
        self.metadata
            .get("sampled")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }

    /// Copy of this series with the same identity but new points and no
    /// sampling provenance.
    pub(crate) fn derive(&self, name: String, points: Vec<DataPoint>) -> Self {
        Self {
            name,
            source_field: self.source_field.clone(),
            series_type: self.series_type,
            color: self.color.clone(),
            points,
            metadata: BTreeMap::new(),
        }
    }
}
