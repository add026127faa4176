//! Mock upstream provider for integration tests
//!
//! Speaks just enough of the OpenAI chat-completions SSE shape: the
//! response body is driven by a per-server script, so tests control the
//! exact bytes (including malformed ones) and their timing.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

/// One step of the scripted response body
#[derive(Debug, Clone)]
pub enum Step {
    /// Write these bytes to the client
    Send(String),
    /// Pause before the next step
    Wait(Duration),
}

/// Build a well-formed content chunk line
pub fn content_chunk(text: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion.chunk",
            "choices": [{"index": 0, "delta": {"content": text}}],
        })
    )
}

/// Build a usage chunk line with an explicit breakdown
pub fn usage_chunk(prompt: u32, completion: u32, total: u32) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion.chunk",
            "choices": [],
            "usage": {
                "prompt_tokens": prompt,
                "completion_tokens": completion,
                "total_tokens": total,
            },
        })
    )
}

pub fn done_line() -> String {
    "data: [DONE]\n\n".to_owned()
}

/// A short, complete happy-path stream
pub fn default_script() -> Vec<Step> {
    vec![
        Step::Send(content_chunk("Hello")),
        Step::Send(content_chunk(" there")),
        Step::Send(usage_chunk(12, 7, 19)),
        Step::Send(done_line()),
    ]
}

struct MockState {
    hits: AtomicU32,
    last_request: Mutex<Option<serde_json::Value>>,
    script: Vec<Step>,
}

pub struct MockLlm {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

impl MockLlm {
    /// Start a mock server answering with [`default_script`]
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with_script(default_script()).await
    }

    /// Start a mock server answering with the given script
    pub async fn start_with_script(script: Vec<Step>) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            hits: AtomicU32::new(0),
            last_request: Mutex::new(None),
            script,
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_completions))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            shutdown,
            state,
        })
    }

    /// Base URL for configuring the mock as a provider
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Number of completion requests received
    pub fn hits(&self) -> u32 {
        self.state.hits.load(Ordering::Relaxed)
    }

    /// Body of the most recent completion request
    pub fn last_request(&self) -> Option<serde_json::Value> {
        self.state.last_request.lock().unwrap().clone()
    }
}

impl Drop for MockLlm {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_completions(
    State(state): State<Arc<MockState>>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::Relaxed);
    *state.last_request.lock().unwrap() = Some(body);

    let script = state.script.clone();
    let (tx, rx) = mpsc::channel::<Bytes>(16);
    tokio::spawn(async move {
        for step in script {
            match step {
                Step::Send(text) => {
                    if tx.send(Bytes::from(text)).await.is_err() {
                        return;
                    }
                }
                Step::Wait(delay) => tokio::time::sleep(delay).await,
            }
        }
    });

    let stream = ReceiverStream::new(rx).map(Ok::<_, Infallible>);
    (
        [(axum::http::header::CONTENT_TYPE, "text/event-stream")],
        axum::body::Body::from_stream(stream),
    )
}
