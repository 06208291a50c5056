use thiserror::Error;

/// Error type for JWT operations.
///
/// Verification failures are distinct variants so that a malformed token
/// is never reported as merely expired.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Failed to sign token: {0}")]
    SigningFailed(String),

    #[error("Token is empty")]
    EmptyToken,

    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    #[error("Token subject is missing")]
    InvalidSubject,

    #[error("Token expired at {expired_at}, current time {now}")]
    ExpiredToken { expired_at: i64, now: i64 },
}
