use async_trait::async_trait;
use auth::Claims;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::account::models::AccountId;
use crate::domain::authorization::models::NewRefreshToken;
use crate::domain::authorization::models::NewSession;
use crate::domain::authorization::models::TokenOwner;
use crate::domain::authorization::models::TokenPair;
use crate::domain::errors::ApplicationError;
use crate::domain::errors::AuthFailure;

/// Stateless login: password check plus a signed token, no server-side state.
#[async_trait]
pub trait CredentialAuthorizerPort: Send + Sync + 'static {
    /// Verify credentials and sign an access token.
    ///
    /// # Errors
    /// * `FailedLogin` wrapping `NoUserEmail`, `PasswordMismatch` or a storage failure
    async fn sign(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<String, ApplicationError>;

    /// Verify a signed token.
    ///
    /// # Errors
    /// * `FailedAuthenticate` wrapping the token verification failure
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, ApplicationError>;
}

/// Two-token flow: short-lived access token plus rotating refresh token.
#[async_trait]
pub trait TokenAuthorizationPort: Send + Sync + 'static {
    /// Log in and issue a token pair.
    ///
    /// # Arguments
    /// * `email` - Account email
    /// * `password` - Plaintext password
    /// * `new_refresh_token` - Random value for the refresh token
    /// * `now` - Issue time
    ///
    /// # Errors
    /// * `FailedCreateToken` wrapping `NoUserEmail` - Unknown email
    /// * `FailedCreateToken` wrapping `PasswordMismatch` - Wrong password
    /// * `FailedCreateToken` wrapping `DuplicateToken` - Refresh value collided
    /// * `FailedCreateToken` wrapping `InternalServerErr` - Storage failed
    async fn claim(
        &self,
        email: &str,
        password: &str,
        new_refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, ApplicationError>;

    /// Exchange a live refresh token for a new token pair.
    ///
    /// # Errors
    /// * `FailedCreateToken` wrapping `NoTokenRecord` - Old value unknown, expired or consumed
    /// * `FailedCreateToken` wrapping `DuplicateToken` - New value collided
    async fn refresh(
        &self,
        new_refresh_token: &str,
        old_refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, ApplicationError>;

    /// Verify an access token.
    ///
    /// # Errors
    /// * `FailedAuthenticate` wrapping the token verification failure
    fn verify(&self, access_token: &str, now: DateTime<Utc>) -> Result<Claims, ApplicationError>;

    /// Verify an access token and require its subject to be `claimed_owner`.
    ///
    /// # Errors
    /// * `FailedAuthenticate` - Token itself is not valid
    /// * `InvalidLoginSession` wrapping `NoSessionRecord` - Token belongs to another account
    fn verify_owner(
        &self,
        claimed_owner: &str,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Claims, ApplicationError>;

    /// Delete a refresh token.
    ///
    /// # Errors
    /// * `FailedRevokeToken` wrapping `NoTokenRecord` - No such token
    async fn revoke(&self, refresh_token: &str) -> Result<(), ApplicationError>;
}

/// Stateful login backed by opaque session tokens.
#[async_trait]
pub trait SessionAuthorizationPort: Send + Sync + 'static {
    /// Log in and register a session.
    ///
    /// # Errors
    /// * `FailedLogin` wrapping the cause; unknown email and wrong password
    ///   are indistinguishable to the caller
    async fn sign(
        &self,
        email: &str,
        password: &str,
        new_session_token: &str,
        now: DateTime<Utc>,
    ) -> Result<String, ApplicationError>;

    /// Check that a session exists and is unexpired.
    ///
    /// # Errors
    /// * `FailedCheckLogin` wrapping `NoSessionRecord`
    async fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<(), ApplicationError>;

    /// Require the session's owner to be `claimed_owner`.
    ///
    /// # Errors
    /// * `InvalidLoginSession` wrapping `NoSessionRecord` - Missing, expired
    ///   or owned by another account
    async fn find_owner(
        &self,
        claimed_owner: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AccountId, ApplicationError>;

    /// Delete the exact (owner, token) session.
    ///
    /// # Errors
    /// * `FailedLogout` wrapping `NoSessionRecord` - No row matched the pair
    async fn sign_out(&self, owner: &str, token: &str) -> Result<(), ApplicationError>;
}

/// Persistence operations for refresh tokens.
#[async_trait]
pub trait TokenStore: Send + Sync + 'static {
    /// Persist a refresh token.
    ///
    /// # Returns
    /// The stored value
    ///
    /// # Errors
    /// * `DuplicateToken` - Value already exists
    /// * `InternalServerErr` - Storage failed
    async fn insert(&self, token: NewRefreshToken) -> Result<String, AuthFailure>;

    /// Resolve the owner of a refresh token that is still live at `now`.
    async fn find_owner(
        &self,
        value: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<TokenOwner>, AuthFailure>;

    /// Delete a refresh token.
    ///
    /// # Errors
    /// * `NoTokenRecord` - No such token
    async fn delete(&self, value: &str) -> Result<(), AuthFailure>;

    /// Replace `old_value` with `token` as one atomic step. Either both the
    /// delete and the insert happen or neither does.
    ///
    /// # Returns
    /// The stored new value
    ///
    /// # Errors
    /// * `NoTokenRecord` - Old value no longer exists
    /// * `DuplicateToken` - New value already exists; old value is kept
    /// * `InternalServerErr` - Storage failed; old value is kept
    async fn rotate(
        &self,
        old_value: &str,
        token: NewRefreshToken,
    ) -> Result<String, AuthFailure>;

    /// Remove tokens expired at `now`, returning how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthFailure>;
}

/// Persistence operations for sessions.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Persist a session.
    ///
    /// # Returns
    /// The stored token
    ///
    /// # Errors
    /// * `DuplicateToken` - Token already exists
    /// * `InternalServerErr` - Storage failed
    async fn register(&self, session: NewSession) -> Result<String, AuthFailure>;

    /// Whether a session with this token is live at `now`.
    async fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<bool, AuthFailure>;

    /// Resolve the owner of a session that is live at `now`.
    async fn find_owner(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AccountId>, AuthFailure>;

    /// Delete the session matching both owner and token.
    ///
    /// # Errors
    /// * `NoSessionRecord` - No row matched the pair
    async fn delete(&self, owner: &AccountId, token: &str) -> Result<(), AuthFailure>;

    /// Remove sessions expired at `now`, returning how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthFailure>;
}
