use async_trait::async_trait;

use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::CreateAccountCommand;
use crate::domain::account::models::UpdateAccountCommand;
use crate::domain::errors::ApplicationError;
use crate::domain::errors::AuthFailure;

/// Port for account management operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Create new account with a hashed password.
    ///
    /// # Errors
    /// * `FailedCreateUser` wrapping `TooLongPassword` - Password exceeds 72 bytes
    /// * `FailedCreateUser` wrapping `DuplicateUserEmail` - Email is already registered
    /// * `FailedCreateUser` wrapping `InternalServerErr` - Storage failed
    async fn create_account(&self, command: CreateAccountCommand)
        -> Result<Account, ApplicationError>;

    /// Retrieve account by identifier.
    ///
    /// # Errors
    /// * `FailedShowUser` wrapping `InvalidUuidFormat` - Malformed identifier
    /// * `FailedShowUser` wrapping `NoUserRecord` - Account does not exist
    async fn get_account(&self, id: &str) -> Result<Account, ApplicationError>;

    /// Retrieve all accounts.
    ///
    /// # Errors
    /// * `FailedListUser` wrapping `InternalServerErr` - Storage failed
    async fn list_accounts(&self) -> Result<Vec<Account>, ApplicationError>;

    /// Update existing account with optional fields.
    ///
    /// # Errors
    /// * `FailedUpdateUser` wrapping `InvalidUuidFormat` - Malformed identifier
    /// * `FailedUpdateUser` wrapping `NoUserRecord` - Account does not exist
    /// * `FailedUpdateUser` wrapping `DuplicateUserEmail` - New email is already registered
    /// * `FailedUpdateUser` wrapping `TooLongPassword` - New password exceeds 72 bytes
    async fn update_account(
        &self,
        id: &str,
        command: UpdateAccountCommand,
    ) -> Result<Account, ApplicationError>;

    /// Delete existing account together with its tokens and sessions.
    ///
    /// # Errors
    /// * `FailedDeleteUser` wrapping `InvalidUuidFormat` - Malformed identifier
    /// * `FailedDeleteUser` wrapping `NoUserRecord` - Account does not exist
    async fn delete_account(&self, id: &str) -> Result<(), ApplicationError>;
}

/// Persistence operations for accounts.
///
/// Deleting an account must also remove its refresh tokens and sessions.
#[async_trait]
pub trait AccountStore: Send + Sync + 'static {
    /// Persist new account.
    ///
    /// # Errors
    /// * `DuplicateUserEmail` - Email is already registered
    /// * `InternalServerErr` - Storage failed
    async fn insert(&self, account: Account) -> Result<Account, AuthFailure>;

    /// Retrieve account by identifier.
    ///
    /// # Returns
    /// Optional account (None if not found)
    async fn find(&self, id: &AccountId) -> Result<Option<Account>, AuthFailure>;

    /// Retrieve account by email address.
    ///
    /// # Returns
    /// Optional account (None if not found)
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthFailure>;

    /// All accounts, newest first.
    async fn list(&self) -> Result<Vec<Account>, AuthFailure>;

    /// Replace a stored account.
    ///
    /// # Errors
    /// * `NoUserRecord` - Account does not exist
    /// * `DuplicateUserEmail` - New email is already registered
    async fn update(&self, account: Account) -> Result<Account, AuthFailure>;

    /// Remove account.
    ///
    /// # Errors
    /// * `NoUserRecord` - Account does not exist
    async fn delete(&self, id: &AccountId) -> Result<(), AuthFailure>;
}
