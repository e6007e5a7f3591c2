//! End-to-end query runs over in-memory client records.

use std::io::Write;

use serde_json::json;

use tally_analytics::{
    AggregationFunction, AnalyticsError, FilterOperator, FilterRule, InsightSeverity, InsightType,
    Progress, QueryConfiguration, QueryEngine, RecordSource, SortDirection,
};
use tally_core::config::AnalyticsConfig;
use tally_core::{ClientRecord, Config, CustomFieldDefinition, CustomFieldType, TallyError};

fn definitions() -> Vec<CustomFieldDefinition> {
    vec![
        CustomFieldDefinition::new("revenue", "Revenue", CustomFieldType::Currency),
        CustomFieldDefinition::new("tier", "Tier", CustomFieldType::Dropdown),
    ]
}

fn engine() -> QueryEngine {
    QueryEngine::new(&definitions())
}

fn clients_with_revenue(values: &[f64]) -> Vec<ClientRecord> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| ClientRecord::new(format!("Client {i:04}")).with_field("revenue", *v))
        .collect()
}

struct OfflineStore;

impl RecordSource for OfflineStore {
    fn load_records(&self) -> Result<Vec<ClientRecord>, TallyError> {
        Err(TallyError::Store("connection refused".into()))
    }
}

// ── Grouped mode ─────────────────────────────────────────────

#[test]
fn grouped_count_accounts_for_every_record() {
    let tiers = [Some("gold"), Some("silver"), Some("bronze"), None];
    let records: Vec<ClientRecord> = (0..30)
        .map(|i| {
            ClientRecord::new(format!("c{i}"))
                .with_field("tier", tiers[i % tiers.len()])
                .with_field("revenue", i as f64)
        })
        .collect();

    let config = QueryConfiguration::default()
        .select("revenue")
        .group_by("tier")
        .without_insights();
    let result = engine().execute(records, &config).unwrap();

    let series = &result.series[0];
    assert_eq!(series.name, "revenue (Count)");
    assert_eq!(series.values().iter().sum::<f64>(), 30.0);
    let labels: Vec<&str> = series.points.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["N/A", "bronze", "gold", "silver"]);
    assert_eq!(result.metadata["mode"], json!("grouped"));
    assert_eq!(result.metadata["group_by"], json!("tier"));
}

#[test]
fn grouped_average_per_tier() {
    let records = vec![
        ClientRecord::new("a").with_field("tier", "gold").with_field("revenue", 100.0),
        ClientRecord::new("b").with_field("tier", "gold").with_field("revenue", 300.0),
        ClientRecord::new("c").with_field("tier", "silver").with_field("revenue", 50.0),
    ];
    let config = QueryConfiguration::default()
        .select("revenue")
        .group_by("tier")
        .aggregate(AggregationFunction::Average)
        .without_insights();
    let result = engine().execute(records, &config).unwrap();
    assert_eq!(result.series[0].values(), vec![200.0, 50.0]);
}

// ── Individual mode ──────────────────────────────────────────

#[test]
fn record_cap_keeps_a_stable_prefix() {
    let values: Vec<f64> = (0..100).map(f64::from).collect();
    let config = QueryConfiguration::default()
        .select("revenue")
        .max_records(Some(40))
        .without_insights();
    let result = engine()
        .execute(clients_with_revenue(&values), &config)
        .unwrap();

    assert_eq!(result.records_analyzed, 40);
    assert_eq!(result.series[0].len(), 40);
    assert_eq!(result.series[0].points[39].label, "Client 0039");
    assert_eq!(result.metadata["record_cap_applied"], json!(true));
    assert_eq!(result.metadata["max_records"], json!(40));
}

#[test]
fn uncapped_query_reports_no_cap() {
    let config = QueryConfiguration::default()
        .select("revenue")
        .max_records(None)
        .without_insights();
    let result = engine()
        .execute(clients_with_revenue(&[1.0, 2.0, 3.0]), &config)
        .unwrap();
    assert_eq!(result.metadata["record_cap_applied"], json!(false));
    assert_eq!(result.metadata["max_records"], json!(null));
}

#[test]
fn oversized_series_is_downsampled_to_budget() {
    let values: Vec<f64> = (0..2000).map(|i| ((i as f64) / 25.0).sin() * 100.0).collect();
    let config = QueryConfiguration::default()
        .select("revenue")
        .max_chart_points(500)
        .without_insights();
    let result = engine()
        .execute(clients_with_revenue(&values), &config)
        .unwrap();

    let series = &result.series[0];
    assert_eq!(series.len(), 500);
    assert!(series.is_sampled());
    assert_eq!(series.metadata["original_count"], json!(2000));
    assert_eq!(series.metadata["sampled_count"], json!(500));
    assert_eq!(series.points[0].label, "Client 0000");
    assert_eq!(series.points[499].label, "Client 1999");
    assert!(result.was_sampled());
    assert_eq!(result.records_analyzed, 2000);
    assert_eq!(result.metadata["sampled_series"], json!(1));
}

#[test]
fn ordering_and_limit_shape_the_series() {
    let config = QueryConfiguration::default()
        .select("revenue")
        .order_by("revenue", SortDirection::Descending)
        .limit(2)
        .without_insights();
    let result = engine()
        .execute(clients_with_revenue(&[5.0, 50.0, 20.0]), &config)
        .unwrap();
    assert_eq!(result.series[0].values(), vec![50.0, 20.0]);
}

// ── Filtering ────────────────────────────────────────────────

#[test]
fn filters_treat_missing_values_as_null() {
    let records = vec![
        ClientRecord::new("paying").with_field("revenue", 10.0),
        ClientRecord::new("blank").with_field("revenue", "   "),
        ClientRecord::new("missing"),
    ];

    let positive = QueryConfiguration::default()
        .select("revenue")
        .filter(FilterRule::new("revenue", FilterOperator::GreaterThan, 0i64))
        .without_insights();
    let result = engine().execute(records.clone(), &positive).unwrap();
    assert_eq!(result.records_analyzed, 1);

    let nulls = QueryConfiguration::default()
        .select("name")
        .filter(FilterRule::is_null("revenue"))
        .without_insights();
    let result = engine().execute(records, &nulls).unwrap();
    assert_eq!(result.records_analyzed, 2);
    assert_eq!(result.metadata["records_total"], json!(3));
    // Names are text, so the plain series carries no points.
    assert!(result.series[0].is_empty());
}

#[test]
fn text_filters_ignore_case() {
    let records = vec![
        ClientRecord::new("Acme Holdings").with_field("revenue", 1.0),
        ClientRecord::new("Globex").with_field("revenue", 2.0),
    ];
    let config = QueryConfiguration::default()
        .select("revenue")
        .filter(FilterRule::new("name", FilterOperator::Contains, "ACME"))
        .without_insights();
    let result = engine().execute(records, &config).unwrap();
    assert_eq!(result.series[0].values(), vec![1.0]);
}

// ── Sources, progress and errors ─────────────────────────────

#[test]
fn source_failure_is_wrapped_with_context() {
    let config = QueryConfiguration::default().select("revenue");
    let err = engine()
        .run(&OfflineStore, &config, Progress::none())
        .unwrap_err();

    assert!(matches!(err, AnalyticsError::Source { .. }));
    let message = err.to_string();
    assert!(message.contains("failed to load client records"), "{message}");
    assert!(message.contains("connection refused"), "{message}");
}

#[test]
fn progress_reports_every_milestone_in_order() {
    let mut seen: Vec<u8> = Vec::new();
    let mut callback = |pct: u8, _msg: &str| seen.push(pct);

    let config = QueryConfiguration::default().select("revenue");
    let source = clients_with_revenue(&[1.0, 2.0, 3.0, 4.0]);
    engine()
        .run(&source, &config, Progress::new(&mut callback))
        .unwrap();

    assert_eq!(seen, vec![5, 20, 40, 60, 75, 90, 100]);
}

#[test]
fn invalid_query_fails_before_loading() {
    let config = QueryConfiguration::default();
    let err = engine()
        .run(&OfflineStore, &config, Progress::none())
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::InvalidQuery(_)));
}

// ── Insights ─────────────────────────────────────────────────

#[test]
fn rising_revenue_yields_positive_trend_and_summary() {
    let values: Vec<f64> = (0..10).map(|i| 100.0 + 2.0 * i as f64).collect();
    let config = QueryConfiguration::default().select("revenue");
    let result = engine()
        .execute(clients_with_revenue(&values), &config)
        .unwrap();

    let types: Vec<InsightType> = result.insights.iter().map(|i| i.insight_type).collect();
    assert_eq!(types, vec![InsightType::Trend, InsightType::Pattern]);
    assert_eq!(result.insights[0].severity, InsightSeverity::Positive);
    assert_eq!(result.insights[1].title, "Performance summary");
}

#[test]
fn thresholds_load_from_configured_rule_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
apiVersion: v1
kind: InsightConfig
metadata:
  id: sensitive
  name: Sensitive anomalies
spec:
  anomaly:
    sigma: 1.5
"#
    )
    .unwrap();

    let config = Config {
        profile: String::new(),
        analytics: AnalyticsConfig {
            insight_config_path: Some(file.path().to_path_buf()),
            ..AnalyticsConfig::default()
        },
    };
    let tuned = QueryEngine::from_config(&config, &definitions()).unwrap();
    assert_eq!(tuned.insight_engine().config().anomaly.sigma, 1.5);

    let query = QueryConfiguration::default().select("revenue");
    let values = [1.0, 2.0, 3.0, 4.0, 100.0];

    let default_result = engine()
        .execute(clients_with_revenue(&values), &query)
        .unwrap();
    assert_eq!(default_result.insights_of(InsightType::Anomaly).count(), 0);

    let tuned_result = tuned.execute(clients_with_revenue(&values), &query).unwrap();
    let anomalies: Vec<_> = tuned_result.insights_of(InsightType::Anomaly).collect();
    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].data["value"], json!(100.0));
}

#[test]
fn invalid_rule_file_surfaces_as_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "apiVersion: v1\nkind: InsightConfig\nmetadata:\n  id: bad\n  name: Bad\nspec:\n  anomaly:\n    sigma: -1\n"
    )
    .unwrap();

    let config = Config {
        profile: String::new(),
        analytics: AnalyticsConfig {
            insight_config_path: Some(file.path().to_path_buf()),
            ..AnalyticsConfig::default()
        },
    };
    let err = QueryEngine::from_config(&config, &definitions()).unwrap_err();
    assert!(matches!(err, AnalyticsError::Config(_)));
}
