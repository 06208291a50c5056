use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;

use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::CreateAccountCommand;
use crate::domain::account::models::UpdateAccountCommand;
use crate::domain::account::ports::AccountServicePort;
use crate::domain::account::ports::AccountStore;
use crate::domain::errors::ApplicationError;
use crate::domain::errors::AuthFailure;
use crate::domain::errors::UseCase;
use crate::domain::errors::WithUseCase;

/// Domain service implementation for account operations.
pub struct AccountService<AS>
where
    AS: AccountStore,
{
    store: Arc<AS>,
    password_hasher: PasswordHasher,
}

impl<AS> AccountService<AS>
where
    AS: AccountStore,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Account persistence implementation
    /// * `password_hasher` - Hasher used for new and changed passwords
    pub fn new(store: Arc<AS>, password_hasher: PasswordHasher) -> Self {
        Self {
            store,
            password_hasher,
        }
    }

    async fn existing(&self, id: &AccountId) -> Result<Account, AuthFailure> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| AuthFailure::NoUserRecord(id.to_string()))
    }
}

#[async_trait]
impl<AS> AccountServicePort for AccountService<AS>
where
    AS: AccountStore,
{
    async fn create_account(
        &self,
        command: CreateAccountCommand,
    ) -> Result<Account, ApplicationError> {
        let password_hash = self
            .password_hasher
            .hash(&command.password)
            .with_use_case(UseCase::FailedCreateUser)?;

        let account = Account {
            id: AccountId::new(),
            email: command.email,
            display_name: command.display_name,
            password_hash,
        };

        let created = self
            .store
            .insert(account)
            .await
            .with_use_case(UseCase::FailedCreateUser)?;

        tracing::info!(account_id = %created.id, "Account created");
        Ok(created)
    }

    async fn get_account(&self, id: &str) -> Result<Account, ApplicationError> {
        let id = AccountId::from_string(id).with_use_case(UseCase::FailedShowUser)?;
        self.existing(&id)
            .await
            .with_use_case(UseCase::FailedShowUser)
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, ApplicationError> {
        self.store
            .list()
            .await
            .with_use_case(UseCase::FailedListUser)
    }

    async fn update_account(
        &self,
        id: &str,
        command: UpdateAccountCommand,
    ) -> Result<Account, ApplicationError> {
        let id = AccountId::from_string(id).with_use_case(UseCase::FailedUpdateUser)?;
        let mut account = self
            .existing(&id)
            .await
            .with_use_case(UseCase::FailedUpdateUser)?;

        if let Some(email) = command.email {
            account.email = email;
        }

        if let Some(display_name) = command.display_name {
            account.display_name = display_name;
        }

        if let Some(password) = command.password {
            account.password_hash = self
                .password_hasher
                .hash(&password)
                .with_use_case(UseCase::FailedUpdateUser)?;
        }

        self.store
            .update(account)
            .await
            .with_use_case(UseCase::FailedUpdateUser)
    }

    async fn delete_account(&self, id: &str) -> Result<(), ApplicationError> {
        let id = AccountId::from_string(id).with_use_case(UseCase::FailedDeleteUser)?;
        self.store
            .delete(&id)
            .await
            .with_use_case(UseCase::FailedDeleteUser)?;

        tracing::info!(account_id = %id, "Account deleted");
        Ok(())
    }
}
