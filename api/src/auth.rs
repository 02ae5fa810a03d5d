use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{error::ApiError, AppState};

/// Rejects the request with 401 unless it carries
/// `Authorization: Bearer <api_key>`. Runs before the body is read.
pub async fn require_bearer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorized = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| token == state.cfg.api_key);

    if !authorized {
        tracing::debug!(uri = %req.uri(), "rejected write without valid bearer token");
        return Err(ApiError::Auth);
    }
    Ok(next.run(req).await)
}
