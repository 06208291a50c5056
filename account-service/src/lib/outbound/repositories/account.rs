use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::internal;
use super::storage_failure;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::ports::AccountStore;
use crate::domain::errors::AuthFailure;

const EMAIL_CONSTRAINT: &str = "accounts_email_key";

pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    display_name: String,
    password_hash: String,
}

impl TryFrom<AccountRow> for Account {
    type Error = AuthFailure;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let email = EmailAddress::new(row.email)
            .map_err(|e| AuthFailure::InternalServerErr(format!("stored email: {}", e)))?;

        Ok(Account {
            id: AccountId(row.id),
            email,
            display_name: row.display_name,
            password_hash: row.password_hash,
        })
    }
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    async fn insert(&self, account: Account) -> Result<Account, AuthFailure> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, email, display_name, password_hash)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(account.id.0)
        .bind(account.email.as_str())
        .bind(&account.display_name)
        .bind(&account.password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            storage_failure(e, EMAIL_CONSTRAINT, || {
                AuthFailure::DuplicateUserEmail(account.email.to_string())
            })
        })?;

        Ok(account)
    }

    async fn find(&self, id: &AccountId) -> Result<Option<Account>, AuthFailure> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, display_name, password_hash
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;

        row.map(Account::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthFailure> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, display_name, password_hash
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;

        row.map(Account::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Account>, AuthFailure> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, display_name, password_hash
            FROM accounts
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;

        rows.into_iter().map(Account::try_from).collect()
    }

    async fn update(&self, account: Account) -> Result<Account, AuthFailure> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET email = $2, display_name = $3, password_hash = $4
            WHERE id = $1
            "#,
        )
        .bind(account.id.0)
        .bind(account.email.as_str())
        .bind(&account.display_name)
        .bind(&account.password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            storage_failure(e, EMAIL_CONSTRAINT, || {
                AuthFailure::DuplicateUserEmail(account.email.to_string())
            })
        })?;

        if result.rows_affected() == 0 {
            return Err(AuthFailure::NoUserRecord(account.id.to_string()));
        }

        Ok(account)
    }

    async fn delete(&self, id: &AccountId) -> Result<(), AuthFailure> {
        // refresh_tokens and sessions cascade on the foreign key
        let result = sqlx::query(
            r#"
            DELETE FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(internal)?;

        if result.rows_affected() == 0 {
            return Err(AuthFailure::NoUserRecord(id.to_string()));
        }

        Ok(())
    }
}
