use tally_core::TallyError;
use tally_rules::RuleError;

/// Failures surfaced at the query boundary. Numeric edge cases never end
/// up here; they degrade to neutral values inside the engine.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("{context}: {source}")]
    Source {
        context: String,
        #[source]
        source: TallyError,
    },

    #[error("Insight config error: {0}")]
    Config(#[from] RuleError),
}
