use tollgate_config::TelemetryConfig;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the configured filter when set, matching the
/// usual operator expectation.
pub fn init(config: &TelemetryConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
}
