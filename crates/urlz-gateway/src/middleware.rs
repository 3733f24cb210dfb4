use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

pub const X_INTERNAL_SECRET: &str = "x-internal-secret";

/// Lets the request through only if `X-Internal-Secret` equals the
/// configured secret.
pub async fn require_internal_secret(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = request
        .headers()
        .get(X_INTERNAL_SECRET)
        .and_then(|value| value.to_str().ok());

    if provided != Some(state.config().internal_secret.as_str()) {
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}
