//! Runs the real gateway router on a random port

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tollgate_config::Config;
use tollgate_server::{AppState, router};
use tollgate_store::MemoryStore;

pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
    store: Arc<MemoryStore>,
}

impl TestServer {
    /// Start the gateway against a fresh in-memory store
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        let store = Arc::new(MemoryStore::new(config.billing.starter_credit));
        let state = AppState::new(config, store.clone())?;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, router(state))
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            shutdown,
            client: reqwest::Client::new(),
            store,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Direct handle on the store behind the running server
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    /// Create a chat for `id_user` and return its id
    pub async fn create_chat(&self, id_user: i64) -> anyhow::Result<i64> {
        let chat: serde_json::Value = self
            .client
            .post(self.url("/chats"))
            .header("x-user-id", id_user)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        chat["id"]
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("chat response missing id"))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
