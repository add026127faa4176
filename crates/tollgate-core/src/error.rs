use http::StatusCode;

/// Contract between feature-crate errors and the HTTP surface
///
/// Catalog, store, and relay errors all end up in a client-facing JSON
/// body of the shape `{"error": {"message", "type"}}`. Each error type
/// describes itself through this trait and the server layer does the
/// conversion, so no feature crate links against axum.
///
/// `error_type` values in use across the gateway:
/// `invalid_request_error`, `authentication_error`, `not_found_error`,
/// `upstream_error`, `internal_error`.
pub trait HttpError: std::error::Error {
    /// Status the response carries
    fn status_code(&self) -> StatusCode;

    /// Stable machine-readable category for client dispatch
    fn error_type(&self) -> &str;

    /// Text placed in the response body
    ///
    /// Anything internal (backend details, provider credential state)
    /// must be replaced with a generic message here; the full error goes
    /// to the logs, not the wire.
    fn client_message(&self) -> String;

    /// Whether the caller can fix this by changing the request
    fn is_client_fault(&self) -> bool {
        self.status_code().is_client_error()
    }
}
