use http::StatusCode;
use thiserror::Error;
use tollgate_core::HttpError;

/// Errors raised while resolving a model to a provider
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Requested identifier matches no catalog entry
    #[error("unknown model: {model}")]
    UnknownModel { model: String },

    /// The entry's provider has no credential configured
    #[error("no credential configured for provider {provider}")]
    MissingCredential { provider: String },
}

impl HttpError for CatalogError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownModel { .. } => StatusCode::BAD_REQUEST,
            Self::MissingCredential { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::UnknownModel { .. } => "invalid_request_error",
            Self::MissingCredential { .. } => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::UnknownModel { .. } => self.to_string(),
            Self::MissingCredential { .. } => "the gateway is misconfigured".to_owned(),
        }
    }
}
