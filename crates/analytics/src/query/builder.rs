//! Turns filtered records into chart series.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::json;

use tally_core::{ClientRecord, FieldValue};

use crate::accessor::FieldAccessors;
use crate::series::{DataPoint, DataSeries, SeriesType};

use super::aggregate::aggregate;
use super::filter::compare;
use super::types::{AggregationFunction, QueryConfiguration, SelectedField, SortDirection};

/// Group key for records whose group-by value is missing.
pub const MISSING_GROUP: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    Grouped,
    Individual,
}

impl QueryMode {
    pub fn for_config(config: &QueryConfiguration) -> Self {
        if config.group_by.is_some() {
            QueryMode::Grouped
        } else {
            QueryMode::Individual
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryMode::Grouped => "grouped",
            QueryMode::Individual => "individual",
        }
    }
}

fn aggregated_name(field: &str, func: AggregationFunction) -> String {
    format!("{} ({})", field, func.label())
}

fn numeric_values(records: &[&ClientRecord], field: &str, accessors: &FieldAccessors) -> Vec<f64> {
    records
        .iter()
        .filter_map(|r| accessors.resolve(r, field).as_f64())
        .collect()
}

/// One bar series per selected field, one point per group. Groups are keyed
/// by the display value of `group_field` and emitted in ascending key order.
pub fn build_grouped(
    records: &[ClientRecord],
    config: &QueryConfiguration,
    group_field: &str,
    accessors: &FieldAccessors,
) -> Vec<DataSeries> {
    let mut groups: BTreeMap<String, Vec<&ClientRecord>> = BTreeMap::new();
    for record in records {
        let value = accessors.resolve(record, group_field);
        let key = if value.is_null() {
            MISSING_GROUP.to_string()
        } else {
            value.to_string()
        };
        groups.entry(key).or_default().push(record);
    }

    config
        .fields
        .iter()
        .map(|selected| {
            let func = config
                .effective_aggregation(selected)
                .unwrap_or(AggregationFunction::Count);

            let points = groups
                .iter()
                .map(|(key, members)| {
                    let values = numeric_values(members, &selected.field, accessors);
                    DataPoint::new(key.clone(), aggregate(func, &values, members.len()))
                })
                .collect();

            let mut series = DataSeries::new(
                aggregated_name(&selected.field, func),
                selected.field.clone(),
                SeriesType::Bar,
            )
            .with_points(points);
            series.metadata.insert("group_by".into(), json!(group_field));
            series.metadata.insert("aggregation".into(), json!(func.label()));
            series
        })
        .collect()
}

/// Ordering used for `order_by`: numbers and timestamps by value, anything
/// else by case-insensitive display text. Nulls always sort last.
fn order_values(a: &FieldValue, b: &FieldValue, direction: SortDirection) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    let ord = compare(a, b)
        .unwrap_or_else(|| a.to_string().to_lowercase().cmp(&b.to_string().to_lowercase()));

    match direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    }
}

/// Apply ordering and row limit. Sorting is stable, so ties keep input order.
pub fn order_and_limit<'r>(
    records: &'r [ClientRecord],
    config: &QueryConfiguration,
    accessors: &FieldAccessors,
) -> Vec<&'r ClientRecord> {
    let mut rows: Vec<&ClientRecord> = records.iter().collect();

    if let Some(order) = &config.order_by {
        let mut keyed: Vec<(FieldValue, &ClientRecord)> = rows
            .into_iter()
            .map(|r| (accessors.resolve(r, &order.field), r))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| order_values(a, b, order.direction));
        rows = keyed.into_iter().map(|(_, r)| r).collect();
    }

    if let Some(limit) = config.limit {
        rows.truncate(limit);
    }

    rows
}

fn individual_series(
    rows: &[&ClientRecord],
    selected: &SelectedField,
    accessors: &FieldAccessors,
) -> DataSeries {
    let points = rows
        .iter()
        .filter_map(|r| {
            accessors
                .resolve(r, &selected.field)
                .as_f64()
                .map(|v| DataPoint::at(r.display_label(), v, r.created_at))
        })
        .collect();

    DataSeries::new(selected.field.clone(), selected.field.clone(), SeriesType::Line)
        .with_points(points)
}

fn standalone_series(
    rows: &[&ClientRecord],
    selected: &SelectedField,
    func: AggregationFunction,
    accessors: &FieldAccessors,
) -> DataSeries {
    let values = numeric_values(rows, &selected.field, accessors);
    let value = aggregate(func, &values, rows.len());

    let mut series = DataSeries::new(
        aggregated_name(&selected.field, func),
        selected.field.clone(),
        SeriesType::Bar,
    )
    .with_points(vec![DataPoint::new(func.label(), value)]);
    series.metadata.insert("aggregation".into(), json!(func.label()));
    series
}

/// Per-record line series for plain fields and single-point bar series for
/// fields carrying an aggregation, in selection order.
pub fn build_individual(
    records: &[ClientRecord],
    config: &QueryConfiguration,
    accessors: &FieldAccessors,
) -> Vec<DataSeries> {
    let rows = order_and_limit(records, config, accessors);

    config
        .fields
        .iter()
        .map(|selected| match config.effective_aggregation(selected) {
            Some(func) => standalone_series(&rows, selected, func, accessors),
            None => individual_series(&rows, selected, accessors),
        })
        .collect()
}
