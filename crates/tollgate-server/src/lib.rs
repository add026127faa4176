#![allow(clippy::must_use_candidate)]

//! HTTP surface of the gateway
//!
//! One axum router: a health probe, thin chat/balance endpoints, and the
//! two AI operations — streamed message send and cancel. Authentication
//! proper lives in front of the gateway; handlers see only the resolved
//! [`tollgate_core::Identity`].

mod ai;
mod error;
mod identity;
mod routes;
mod state;
mod types;

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
pub use types::{CancelRequest, CancelResponse, SendMessageRequest};

/// Bind and serve until the shutdown token fires
pub async fn serve(
    addr: SocketAddr,
    state: AppState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}
