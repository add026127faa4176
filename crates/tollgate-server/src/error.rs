use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;
use thiserror::Error;
use tollgate_catalog::CatalogError;
use tollgate_core::HttpError;
use tollgate_relay::RelayError;
use tollgate_store::StoreError;

/// Every failure a handler can surface to a client
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body failed a semantic check
    #[error("{0}")]
    Validation(String),

    /// Caller identity is missing or malformed
    #[error("missing or invalid x-user-id header")]
    Unauthenticated,

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl HttpError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Catalog(err) => err.status_code(),
            Self::Store(err) => err.status_code(),
            Self::Relay(err) => err.status_code(),
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::Validation(_) => "invalid_request_error",
            Self::Unauthenticated => "authentication_error",
            Self::Catalog(err) => err.error_type(),
            Self::Store(err) => err.error_type(),
            Self::Relay(err) => err.error_type(),
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Validation(_) | Self::Unauthenticated => self.to_string(),
            Self::Catalog(err) => err.client_message(),
            Self::Store(err) => err.client_message(),
            Self::Relay(err) => err.client_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "message": self.client_message(),
                "type": self.error_type(),
            }
        });
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = ApiError::Validation("idRequest must not be empty".to_owned());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_type(), "invalid_request_error");
    }

    #[test]
    fn wrapped_errors_keep_their_mapping() {
        let err = ApiError::from(CatalogError::UnknownModel {
            model: "nope".to_owned(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = ApiError::from(StoreError::ChatNotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = ApiError::from(RelayError::UpstreamStatus {
            status: 429,
            body: "slow down".to_owned(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }
}
