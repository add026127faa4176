use serde::Deserialize;

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Default `tracing` filter directive, overridable via `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Emit logs as JSON lines instead of the human-readable format
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            json_logs: false,
        }
    }
}

fn default_log_filter() -> String {
    "info".to_owned()
}
