use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Read `.env` into the process environment when one exists.
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!(error = %e, "ignoring unreadable .env file");
        }
    }
}

/// Environment lookups scoped to a profile: `{PROFILE}_{KEY}` wins over
/// `{KEY}`. Blank values count as unset.
struct ProfiledEnv<'a> {
    profile: &'a str,
}

impl<'a> ProfiledEnv<'a> {
    fn new(profile: &'a str) -> Self {
        Self { profile }
    }

    fn get(&self, key: &str) -> Option<String> {
        let scoped = (!self.profile.is_empty()).then(|| format!("{}_{}", self.profile, key));
        scoped
            .into_iter()
            .chain(std::iter::once(key.to_string()))
            .find_map(|name| env::var(name).ok().filter(|v| !v.trim().is_empty()))
    }

    fn parse_or<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        self.get(key).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        self.get(key).map_or(default, |v| {
            matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
        })
    }
}

/// Default record cap applied before series construction.
pub const DEFAULT_MAX_RECORDS: usize = 5000;

/// Default chart-point budget per series.
pub const DEFAULT_MAX_CHART_POINTS: usize = 500;

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub analytics: AnalyticsConfig,
}

impl Config {
    /// Load `.env` if present, then build config from the environment.
    pub fn load() -> Self {
        load_dotenv();
        Self::from_env()
    }

    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `TALLY_PROFILE`. When set (e.g. `PROD`), every key
    /// is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env::var("TALLY_PROFILE").unwrap_or_default();
        Self::for_profile(profile.trim())
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        Self {
            analytics: AnalyticsConfig::from_env_profiled(&p),
            profile: p,
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        let a = &self.analytics;
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  analytics:   max_records={}, max_chart_points={}, insights={}",
            a.max_records.map(|n| n.to_string()).unwrap_or_else(|| "unlimited".into()),
            a.max_chart_points,
            a.insights_enabled
        );
        tracing::info!(
            "  thresholds:  {}",
            a.insight_config_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(built-in)".into())
        );
    }

    /// JSON view for diagnostics endpoints and report footers.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "analytics": {
                "max_records": self.analytics.max_records,
                "max_chart_points": self.analytics.max_chart_points,
                "insights_enabled": self.analytics.insights_enabled,
                "insight_config_path": self.analytics.insight_config_path,
            },
        })
    }
}

// ── Analytics ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Record cap before series construction. `None` disables the cap.
    pub max_records: Option<usize>,
    /// Individual series longer than this are downsampled.
    pub max_chart_points: usize,
    pub insights_enabled: bool,
    /// Optional YAML `InsightConfig` document overriding built-in thresholds.
    pub insight_config_path: Option<PathBuf>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            max_records: Some(DEFAULT_MAX_RECORDS),
            max_chart_points: DEFAULT_MAX_CHART_POINTS,
            insights_enabled: true,
            insight_config_path: None,
        }
    }
}

impl AnalyticsConfig {
    fn from_env_profiled(p: &str) -> Self {
        let vars = ProfiledEnv::new(p);
        // 0 means "no cap".
        let max_records = vars.parse_or("MAX_RECORDS", DEFAULT_MAX_RECORDS);
        Self {
            max_records: (max_records > 0).then_some(max_records),
            max_chart_points: vars.parse_or("MAX_CHART_POINTS", DEFAULT_MAX_CHART_POINTS),
            insights_enabled: vars.flag("INSIGHTS_ENABLED", true),
            insight_config_path: vars.get("INSIGHT_CONFIG_PATH").map(PathBuf::from),
        }
    }
}
