use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use secrecy::ExposeSecret;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use tollgate_catalog::ResolvedModel;

use crate::builder::UpstreamRequest;
use crate::error::RelayError;
use crate::frame::FrameParser;
use crate::usage::{TailBuffer, TokenUsage, UsageMeter};

/// Terminal disposition of one relayed stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Upstream finished the stream on its own
    Completed,
    /// Cut short by a cancel call or the client going away
    Cancelled,
    /// Upstream died mid-stream or went silent past the idle limit
    Errored,
}

/// What one relayed stream amounted to once it ended
#[derive(Debug)]
pub struct RelayOutcome {
    pub state: RelayState,
    pub usage: TokenUsage,
    /// Assistant text reassembled from the frames that parsed
    pub assistant_text: String,
}

/// Drives one upstream request and fans its bytes out
///
/// Bytes go to the client channel before anything else happens to them;
/// parsing and metering work on a copy and can never delay or reorder
/// what the client sees.
#[derive(Debug, Clone)]
pub struct StreamRelay {
    client: reqwest::Client,
    idle_timeout: Duration,
}

impl StreamRelay {
    pub fn new(client: reqwest::Client, idle_timeout: Duration) -> Self {
        Self {
            client,
            idle_timeout,
        }
    }

    /// Open the upstream connection
    ///
    /// All failures before the first streamed byte surface here, so the
    /// caller can still return a synchronous error response. Once this
    /// returns `Ok`, [`StreamRelay::relay`] always reaches a terminal
    /// state.
    pub async fn open(
        &self,
        model: &ResolvedModel,
        payload: &UpstreamRequest,
    ) -> Result<reqwest::Response, RelayError> {
        let url = format!(
            "{}/chat/completions",
            model.base_url.as_str().trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(model.api_key.expose_secret())
            .header(http::header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    /// Drive an opened stream to a terminal state
    pub async fn relay(
        &self,
        model: &ResolvedModel,
        response: reqwest::Response,
        prompt_estimate: usize,
        token: &CancellationToken,
        tx: &mpsc::Sender<Bytes>,
    ) -> RelayOutcome {
        let mut stream = response.bytes_stream();
        let mut parser = FrameParser::new();
        let mut meter = UsageMeter::new(prompt_estimate);
        let mut tail = TailBuffer::new();
        let mut assistant_text = String::new();

        let state = loop {
            let next = tokio::select! {
                () = token.cancelled() => break RelayState::Cancelled,
                next = timeout(self.idle_timeout, stream.next()) => next,
            };

            let chunk = match next {
                Err(_) => {
                    warn!(model = %model.name, idle_secs = self.idle_timeout.as_secs(), "upstream went silent, abandoning stream");
                    break RelayState::Errored;
                }
                Ok(None) => break RelayState::Completed,
                Ok(Some(Err(err))) => {
                    if token.is_cancelled() {
                        break RelayState::Cancelled;
                    }
                    warn!(model = %model.name, error = %err, "upstream stream failed mid-flight");
                    break RelayState::Errored;
                }
                Ok(Some(Ok(chunk))) => chunk,
            };

            // Forward first. A closed receiver means the client has gone
            // away, which counts as a cancellation.
            if tx.send(chunk.clone()).await.is_err() {
                debug!(model = %model.name, "client receiver dropped, cancelling relay");
                break RelayState::Cancelled;
            }

            tail.push(chunk.clone());
            let mut done = false;
            for frame in parser.push(&chunk) {
                if let Some(content) = &frame.content {
                    assistant_text.push_str(content);
                }
                meter.observe(&frame);
                done |= frame.done;
            }
            if done {
                break RelayState::Completed;
            }
        };

        let usage = meter.finalize(&tail, state);
        debug!(
            model = %model.name,
            state = ?state,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "relay reached terminal state"
        );

        RelayOutcome {
            state,
            usage,
            assistant_text,
        }
    }
}
