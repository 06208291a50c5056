use std::sync::Arc;

use async_trait::async_trait;
use auth::Claims;
use auth::PasswordHasher;
use auth::TokenSigner;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::domain::account::models::AccountId;
use crate::domain::account::ports::AccountStore;
use crate::domain::authorization::credential::authenticate_account;
use crate::domain::authorization::models::NewRefreshToken;
use crate::domain::authorization::models::RotationPolicy;
use crate::domain::authorization::models::TokenPair;
use crate::domain::authorization::ports::TokenAuthorizationPort;
use crate::domain::authorization::ports::TokenStore;
use crate::domain::errors::ApplicationError;
use crate::domain::errors::AuthFailure;
use crate::domain::errors::UseCase;
use crate::domain::errors::WithUseCase;

/// Lifetimes of the two token kinds.
#[derive(Debug, Clone, Copy)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
}

/// Access + rotating refresh token authorization.
///
/// Holds no mutable state; concurrent refreshes of the same value are
/// arbitrated by `TokenStore::rotate`.
pub struct TokenAuthorization<AS, TS>
where
    AS: AccountStore,
    TS: TokenStore,
{
    accounts: Arc<AS>,
    tokens: Arc<TS>,
    signer: Arc<TokenSigner>,
    password_hasher: PasswordHasher,
    lifetimes: TokenLifetimes,
    rotation: RotationPolicy,
}

impl<AS, TS> TokenAuthorization<AS, TS>
where
    AS: AccountStore,
    TS: TokenStore,
{
    pub fn new(
        accounts: Arc<AS>,
        tokens: Arc<TS>,
        signer: Arc<TokenSigner>,
        password_hasher: PasswordHasher,
        lifetimes: TokenLifetimes,
        rotation: RotationPolicy,
    ) -> Self {
        Self {
            accounts,
            tokens,
            signer,
            password_hasher,
            lifetimes,
            rotation,
        }
    }

    fn sign_access(
        &self,
        owner: &AccountId,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<String, AuthFailure> {
        self.signer
            .sign(&owner.to_string(), email, now, now + self.lifetimes.access)
            .map_err(|e| {
                tracing::error!(account_id = %owner, error = %e, "Access token signing failed");
                AuthFailure::from(e)
            })
    }

    async fn store_refresh(
        &self,
        owner: AccountId,
        value: &str,
        now: DateTime<Utc>,
    ) -> Result<String, AuthFailure> {
        self.tokens
            .insert(NewRefreshToken {
                owner,
                value: value.to_string(),
                expires_at: now + self.lifetimes.refresh,
            })
            .await
    }
}

#[async_trait]
impl<AS, TS> TokenAuthorizationPort for TokenAuthorization<AS, TS>
where
    AS: AccountStore,
    TS: TokenStore,
{
    async fn claim(
        &self,
        email: &str,
        password: &str,
        new_refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, ApplicationError> {
        let account =
            authenticate_account(self.accounts.as_ref(), &self.password_hasher, email, password)
                .await
                .map_err(|e| {
                    tracing::warn!(reason = %e, "Token claim rejected");
                    ApplicationError::new(UseCase::FailedCreateToken, e)
                })?;

        // Signed first so that a signing failure never leaves a refresh row behind
        let access_token = self
            .sign_access(&account.id, account.email.as_str(), now)
            .with_use_case(UseCase::FailedCreateToken)?;

        let refresh_token = self
            .store_refresh(account.id, new_refresh_token, now)
            .await
            .with_use_case(UseCase::FailedCreateToken)?;

        tracing::info!(account_id = %account.id, "Issued token pair");
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    async fn refresh(
        &self,
        new_refresh_token: &str,
        old_refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, ApplicationError> {
        let owner = self
            .tokens
            .find_owner(old_refresh_token, now)
            .await
            .with_use_case(UseCase::FailedCreateToken)?
            .ok_or_else(|| {
                tracing::warn!("Refresh rejected: unknown or expired refresh token");
                ApplicationError::new(
                    UseCase::FailedCreateToken,
                    AuthFailure::NoTokenRecord("refresh token unknown or expired".into()),
                )
            })?;

        let access_token = self
            .sign_access(&owner.id, &owner.email, now)
            .with_use_case(UseCase::FailedCreateToken)?;

        let refresh_token = match self.rotation {
            // A concurrent refresh with the same value loses the rotation
            RotationPolicy::Consume => self
                .tokens
                .rotate(
                    old_refresh_token,
                    NewRefreshToken {
                        value: new_refresh_token.to_string(),
                        owner: owner.id,
                        expires_at: now + self.lifetimes.refresh,
                    },
                )
                .await
                .map_err(|e| {
                    tracing::warn!(account_id = %owner.id, reason = %e, "Refresh token rotation failed");
                    ApplicationError::new(UseCase::FailedCreateToken, e)
                })?,
            RotationPolicy::Retain => self
                .store_refresh(owner.id, new_refresh_token, now)
                .await
                .with_use_case(UseCase::FailedCreateToken)?,
        };

        tracing::info!(account_id = %owner.id, "Rotated refresh token");
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    fn verify(&self, access_token: &str, now: DateTime<Utc>) -> Result<Claims, ApplicationError> {
        self.signer
            .verify(access_token, now)
            .with_use_case(UseCase::FailedAuthenticate)
    }

    fn verify_owner(
        &self,
        claimed_owner: &str,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Claims, ApplicationError> {
        let claims = self.verify(access_token, now)?;

        if claims.sub != claimed_owner {
            tracing::warn!(subject = %claims.sub, claimed = %claimed_owner, "Access token owner mismatch");
            return Err(ApplicationError::new(
                UseCase::InvalidLoginSession,
                AuthFailure::NoSessionRecord(format!(
                    "token subject {} does not own {}",
                    claims.sub, claimed_owner
                )),
            ));
        }

        Ok(claims)
    }

    async fn revoke(&self, refresh_token: &str) -> Result<(), ApplicationError> {
        self.tokens
            .delete(refresh_token)
            .await
            .with_use_case(UseCase::FailedRevokeToken)
    }
}
