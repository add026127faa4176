#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;
mod telemetry;

use std::sync::Arc;

use args::Args;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tollgate_config::Config;
use tollgate_server::AppState;
use tollgate_store::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    if args.check_config {
        println!("configuration ok: {}", args.config.display());
        return Ok(());
    }
    if let Some(filter) = args.log_filter {
        config.telemetry.log_filter = filter;
    }
    telemetry::init(&config.telemetry)?;

    tracing::info!(
        config_path = %args.config.display(),
        "starting tollgate"
    );

    let addr = args.listen.unwrap_or_else(|| config.server.bind_addr());
    let store = Arc::new(MemoryStore::new(config.billing.starter_credit));
    let state = AppState::new(config, store)?;

    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_clone.cancel();
    });

    tollgate_server::serve(addr, state, shutdown).await?;

    tracing::info!("tollgate stopped");
    Ok(())
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
