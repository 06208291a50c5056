use axum::extract::Path;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use crate::domain::authorization::ports::SessionAuthorizationPort;
use crate::domain::authorization::ports::TokenAuthorizationPort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Only lets the request through when the session token belongs to the
/// account named in the path.
pub async fn require_session_owner(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?;

    state
        .session_authorization
        .find_owner(&account_id, token, Utc::now())
        .await
        .map_err(ApiError::from)?;

    Ok(next.run(req).await)
}

/// Only lets the request through when the access token's subject is the
/// account named in the path.
pub async fn require_access_owner(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?;

    state
        .token_authorization
        .verify_owner(&account_id, token, Utc::now())
        .map_err(ApiError::from)?;

    Ok(next.run(req).await)
}

/// Token carried as `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;

    auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::Unauthorized(
            "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
        )
    })
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Ok("abc.def"));
    }
}
