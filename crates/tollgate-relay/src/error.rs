use http::StatusCode;
use thiserror::Error;
use tollgate_core::HttpError;

/// Errors raised before streaming begins
///
/// Failures after the first byte has been forwarded never surface as an
/// error value; they end the stream and are reported through the relay's
/// terminal state instead.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Connection-level failure reaching the provider
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider rejected the request before any streaming happened
    #[error("upstream returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },
}

impl HttpError for RelayError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_GATEWAY
    }

    fn error_type(&self) -> &str {
        "upstream_error"
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}
