use std::sync::Arc;

use async_trait::async_trait;
use auth::Claims;
use auth::PasswordHasher;
use auth::TokenSigner;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::domain::account::models::Account;
use crate::domain::account::ports::AccountStore;
use crate::domain::authorization::ports::CredentialAuthorizerPort;
use crate::domain::errors::ApplicationError;
use crate::domain::errors::AuthFailure;
use crate::domain::errors::UseCase;
use crate::domain::errors::WithUseCase;

/// Resolve an account by email and check its password.
///
/// # Errors
/// * `NoUserEmail` - No account with this email
/// * `PasswordMismatch` - Password does not match the stored hash
/// * `InternalServerErr` - Storage failed or the stored hash is unreadable
pub(crate) async fn authenticate_account<AS>(
    accounts: &AS,
    password_hasher: &PasswordHasher,
    email: &str,
    password: &str,
) -> Result<Account, AuthFailure>
where
    AS: AccountStore + ?Sized,
{
    let Some(account) = accounts.find_by_email(email).await? else {
        // Same Argon2 work as a wrong password
        let _ = password_hasher.verify_unknown(password);
        return Err(AuthFailure::NoUserEmail(email.to_string()));
    };

    password_hasher.verify(password, &account.password_hash)?;

    Ok(account)
}

/// Stateless authorizer: password verification plus a signed token.
pub struct CredentialAuthorizer<AS>
where
    AS: AccountStore,
{
    accounts: Arc<AS>,
    signer: Arc<TokenSigner>,
    password_hasher: PasswordHasher,
    expiration: Duration,
}

impl<AS> CredentialAuthorizer<AS>
where
    AS: AccountStore,
{
    /// # Arguments
    /// * `accounts` - Account lookup
    /// * `signer` - Token signer holding the secret
    /// * `password_hasher` - Hasher used to check passwords
    /// * `expiration` - Lifetime of issued tokens
    pub fn new(
        accounts: Arc<AS>,
        signer: Arc<TokenSigner>,
        password_hasher: PasswordHasher,
        expiration: Duration,
    ) -> Self {
        Self {
            accounts,
            signer,
            password_hasher,
            expiration,
        }
    }
}

#[async_trait]
impl<AS> CredentialAuthorizerPort for CredentialAuthorizer<AS>
where
    AS: AccountStore,
{
    async fn sign(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<String, ApplicationError> {
        let account =
            authenticate_account(self.accounts.as_ref(), &self.password_hasher, email, password)
                .await
                .map_err(|e| {
                    tracing::warn!(reason = %e, "Credential login rejected");
                    ApplicationError::new(UseCase::FailedLogin, e)
                })?;

        let token = self
            .signer
            .sign(
                &account.id.to_string(),
                account.email.as_str(),
                now,
                now + self.expiration,
            )
            .map_err(|e| {
                tracing::error!(account_id = %account.id, error = %e, "Token signing failed");
                ApplicationError::new(UseCase::FailedLogin, e)
            })?;

        tracing::debug!(account_id = %account.id, "Signed credential token");
        Ok(token)
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, ApplicationError> {
        self.signer
            .verify(token, now)
            .with_use_case(UseCase::FailedAuthenticate)
    }
}
