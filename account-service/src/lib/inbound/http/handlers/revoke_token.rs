use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::refresh_token::RefreshTokenRequestBody;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::authorization::ports::TokenAuthorizationPort;
use crate::inbound::http::router::AppState;

pub async fn revoke_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequestBody>,
) -> Result<ApiSuccess<()>, ApiError> {
    state
        .token_authorization
        .revoke(&body.value)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::NO_CONTENT, ()))
}
