use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tollgate_core::Identity;

use crate::error::ApiError;

const USER_HEADER: &str = "x-user-id";

/// Require an `x-user-id` header and attach it as an [`Identity`]
///
/// Stands in for the real authentication layer, which terminates in
/// front of the gateway and forwards the resolved user id.
pub async fn require_identity(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let id_user = request
        .headers()
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i64>().ok())
        .ok_or(ApiError::Unauthenticated)?;

    request.extensions_mut().insert(Identity::new(id_user));
    Ok(next.run(request).await)
}
