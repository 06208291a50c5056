use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::ApiError;
use super::ApiSuccess;
use super::TokenPairData;
use crate::domain::authorization::ports::TokenAuthorizationPort;
use crate::inbound::http::router::AppState;

/// Refresh token value presented by the client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshTokenRequestBody {
    pub value: String,
}

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequestBody>,
) -> Result<ApiSuccess<TokenPairData>, ApiError> {
    let new_refresh_token = Uuid::new_v4().to_string();

    state
        .token_authorization
        .refresh(&new_refresh_token, &body.value, Utc::now())
        .await
        .map_err(ApiError::from)
        .map(|pair| ApiSuccess::new(StatusCode::OK, TokenPairData::from(pair)))
}
