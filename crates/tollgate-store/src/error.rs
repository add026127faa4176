use http::StatusCode;
use thiserror::Error;
use tollgate_core::HttpError;

/// Errors returned by a [`crate::GatewayStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    /// Referenced chat does not exist or belongs to another user
    #[error("chat not found")]
    ChatNotFound,

    /// Backend-specific failure
    #[error("storage failure: {0}")]
    Backend(String),
}

impl HttpError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ChatNotFound => StatusCode::NOT_FOUND,
            Self::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::ChatNotFound => "not_found_error",
            Self::Backend(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::ChatNotFound => self.to_string(),
            Self::Backend(_) => "a storage error occurred".to_owned(),
        }
    }
}
