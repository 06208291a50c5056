use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use super::login::LoginRequestBody;
use super::login::LoginResponseData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::authorization::ports::SessionAuthorizationPort;
use crate::inbound::http::router::AppState;

pub async fn session_login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let session_token = Uuid::new_v4().to_string();

    state
        .session_authorization
        .sign(&body.email, &body.password, &session_token, Utc::now())
        .await
        .map_err(ApiError::from)
        .map(|token| ApiSuccess::new(StatusCode::OK, LoginResponseData { token }))
}
