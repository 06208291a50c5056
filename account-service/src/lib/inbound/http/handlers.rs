use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::domain::account::models::Account;
use crate::domain::authorization::models::TokenPair;
use crate::domain::errors::ApplicationError;
use crate::domain::errors::AuthFailure;
use crate::domain::errors::UseCase;

pub mod claim_token;
pub mod create_account;
pub mod delete_account;
pub mod get_account;
pub mod list_accounts;
pub mod login;
pub mod refresh_token;
pub mod revoke_token;
pub mod session_login;
pub mod session_logout;
pub mod update_account;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

/// Only the use-case message reaches the caller; the cause is logged.
impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        let message = err.use_case().to_string();

        if err.is_internal() {
            tracing::error!(
                use_case = ?err.use_case(),
                cause = ?err.cause(),
                "Request failed on infrastructure"
            );
            return ApiError::InternalServerError(message);
        }

        tracing::debug!(use_case = ?err.use_case(), cause = %err.cause(), "Request rejected");

        match err.cause() {
            AuthFailure::DuplicateUserEmail(_) | AuthFailure::DuplicateToken(_) => {
                ApiError::Conflict(message)
            }
            AuthFailure::TooLongPassword(_) | AuthFailure::InvalidUuidFormat(_) => {
                ApiError::UnprocessableEntity(message)
            }
            AuthFailure::NoUserRecord(_) => ApiError::NotFound(message),
            _ => match err.use_case() {
                UseCase::InvalidLoginSession | UseCase::FailedLogout | UseCase::FailedRevokeToken => {
                    ApiError::NotFound(message)
                }
                _ => ApiError::Unauthorized(message),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Public view of an account. The password hash never leaves the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountData {
    pub id: String,
    pub email: String,
    pub display_name: String,
}

impl From<&Account> for AccountData {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            email: account.email.as_str().to_string(),
            display_name: account.display_name.clone(),
        }
    }
}

/// Access and refresh token returned by claim and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPairData {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokenPair> for TokenPairData {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }
    }
}
