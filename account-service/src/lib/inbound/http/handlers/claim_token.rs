use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use super::login::LoginRequestBody;
use super::ApiError;
use super::ApiSuccess;
use super::TokenPairData;
use crate::domain::authorization::ports::TokenAuthorizationPort;
use crate::inbound::http::router::AppState;

pub async fn claim_token(
    State(state): State<AppState>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<TokenPairData>, ApiError> {
    let refresh_token = Uuid::new_v4().to_string();

    state
        .token_authorization
        .claim(&body.email, &body.password, &refresh_token, Utc::now())
        .await
        .map_err(ApiError::from)
        .map(|pair| ApiSuccess::new(StatusCode::OK, TokenPairData::from(pair)))
}
