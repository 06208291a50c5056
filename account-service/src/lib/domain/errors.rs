use std::fmt;

use auth::PasswordError;
use auth::TokenError;
use thiserror::Error;

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Storage and verification level failure.
///
/// The `String` payloads are internal detail for diagnostics. They never
/// appear in the `Display` output, which is safe to show a caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("User record not found")]
    NoUserRecord(String),

    #[error("No user registered with this email")]
    NoUserEmail(String),

    #[error("Email already exists")]
    DuplicateUserEmail(String),

    #[error("Token record not found")]
    NoTokenRecord(String),

    #[error("Token already exists")]
    DuplicateToken(String),

    #[error("Session record not found")]
    NoSessionRecord(String),

    #[error("Token is empty")]
    EmptyToken,

    #[error("Token is expired")]
    ExpiredToken(String),

    #[error("Token is invalid")]
    InvalidToken(String),

    #[error("Token subject is invalid")]
    InvalidSubject,

    #[error("Password does not match")]
    PasswordMismatch,

    #[error("Password must be at most 72 bytes")]
    TooLongPassword(String),

    #[error("Invalid UUID format")]
    InvalidUuidFormat(String),

    #[error("Failed to sign token")]
    SigningFailed(String),

    #[error("Internal server error")]
    InternalServerErr(String),
}

impl AuthFailure {
    /// Internal detail attached to this failure, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            AuthFailure::NoUserRecord(d)
            | AuthFailure::NoUserEmail(d)
            | AuthFailure::DuplicateUserEmail(d)
            | AuthFailure::NoTokenRecord(d)
            | AuthFailure::DuplicateToken(d)
            | AuthFailure::NoSessionRecord(d)
            | AuthFailure::ExpiredToken(d)
            | AuthFailure::InvalidToken(d)
            | AuthFailure::TooLongPassword(d)
            | AuthFailure::InvalidUuidFormat(d)
            | AuthFailure::SigningFailed(d)
            | AuthFailure::InternalServerErr(d) => Some(d),
            AuthFailure::EmptyToken | AuthFailure::InvalidSubject | AuthFailure::PasswordMismatch => {
                None
            }
        }
    }

    /// Whether the failure comes from infrastructure rather than the caller.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AuthFailure::InternalServerErr(_) | AuthFailure::SigningFailed(_)
        )
    }
}

impl From<PasswordError> for AuthFailure {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooLong { .. } => AuthFailure::TooLongPassword(err.to_string()),
            PasswordError::Mismatch => AuthFailure::PasswordMismatch,
            PasswordError::HashingFailed(_)
            | PasswordError::InvalidHash(_)
            | PasswordError::InvalidParameters(_) => AuthFailure::InternalServerErr(err.to_string()),
        }
    }
}

impl From<TokenError> for AuthFailure {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::EmptyToken => AuthFailure::EmptyToken,
            TokenError::InvalidToken(detail) => AuthFailure::InvalidToken(detail),
            TokenError::InvalidSubject => AuthFailure::InvalidSubject,
            TokenError::ExpiredToken { .. } => AuthFailure::ExpiredToken(err.to_string()),
            TokenError::SigningFailed(detail) => AuthFailure::SigningFailed(detail),
        }
    }
}

/// Use case in which a failure occurred.
///
/// This is the reason that crosses into the externally visible layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseCase {
    FailedShowUser,
    FailedListUser,
    FailedCreateUser,
    FailedUpdateUser,
    FailedDeleteUser,
    FailedAuthenticate,
    FailedCreateToken,
    FailedRevokeToken,
    FailedCheckLogin,
    FailedLogin,
    FailedLogout,
    InvalidLoginSession,
}

impl fmt::Display for UseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            UseCase::FailedShowUser => "Failed to fetch user",
            UseCase::FailedListUser => "Failed to list users",
            UseCase::FailedCreateUser => "Failed to create user",
            UseCase::FailedUpdateUser => "Failed to update user",
            UseCase::FailedDeleteUser => "Failed to delete user",
            UseCase::FailedAuthenticate => "Authentication failed",
            UseCase::FailedCreateToken => "Failed to create token",
            UseCase::FailedRevokeToken => "Failed to revoke token",
            UseCase::FailedCheckLogin => "Could not confirm login",
            UseCase::FailedLogin => "Login failed",
            UseCase::FailedLogout => "Logout failed",
            UseCase::InvalidLoginSession => "Invalid login session",
        };
        f.write_str(message)
    }
}

/// Use-case level error wrapping the underlying failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{use_case}")]
pub struct ApplicationError {
    use_case: UseCase,
    #[source]
    cause: AuthFailure,
}

impl ApplicationError {
    pub fn new(use_case: UseCase, cause: impl Into<AuthFailure>) -> Self {
        Self {
            use_case,
            cause: cause.into(),
        }
    }

    pub fn use_case(&self) -> UseCase {
        self.use_case
    }

    /// Underlying storage or verification failure.
    pub fn cause(&self) -> &AuthFailure {
        &self.cause
    }

    pub fn into_cause(self) -> AuthFailure {
        self.cause
    }

    pub fn is_internal(&self) -> bool {
        self.cause.is_internal()
    }
}

/// Attach a use case to a lower-level result.
pub trait WithUseCase<T> {
    fn with_use_case(self, use_case: UseCase) -> Result<T, ApplicationError>;
}

impl<T, E> WithUseCase<T> for Result<T, E>
where
    E: Into<AuthFailure>,
{
    fn with_use_case(self, use_case: UseCase) -> Result<T, ApplicationError> {
        self.map_err(|e| ApplicationError::new(use_case, e))
    }
}
