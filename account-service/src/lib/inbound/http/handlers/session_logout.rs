use axum::extract::Path;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::authorization::ports::SessionAuthorizationPort;
use crate::inbound::http::middleware::bearer_token;
use crate::inbound::http::router::AppState;

/// Ends the presented session; the exact (owner, token) pair must exist.
pub async fn session_logout(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<ApiSuccess<()>, ApiError> {
    let token = bearer_token(&headers)?;

    state
        .session_authorization
        .sign_out(&id, token)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::NO_CONTENT, ()))
}
