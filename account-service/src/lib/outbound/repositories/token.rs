use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::internal;
use super::storage_failure;
use crate::domain::account::models::AccountId;
use crate::domain::authorization::models::NewRefreshToken;
use crate::domain::authorization::models::TokenOwner;
use crate::domain::authorization::ports::TokenStore;
use crate::domain::errors::AuthFailure;

pub struct PostgresTokenStore {
    pool: PgPool,
}

impl PostgresTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OwnerRow {
    id: Uuid,
    email: String,
}

#[async_trait]
impl TokenStore for PostgresTokenStore {
    async fn insert(&self, token: NewRefreshToken) -> Result<String, AuthFailure> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (value, account_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&token.value)
        .bind(token.owner.0)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            storage_failure(e, "refresh_tokens_pkey", || {
                AuthFailure::DuplicateToken("refresh token value already stored".into())
            })
        })?;

        Ok(token.value)
    }

    async fn find_owner(
        &self,
        value: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<TokenOwner>, AuthFailure> {
        let row = sqlx::query_as::<_, OwnerRow>(
            r#"
            SELECT a.id, a.email
            FROM refresh_tokens t
            JOIN accounts a ON a.id = t.account_id
            WHERE t.value = $1 AND t.expires_at > $2
            "#,
        )
        .bind(value)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;

        Ok(row.map(|r| TokenOwner {
            id: AccountId(r.id),
            email: r.email,
        }))
    }

    async fn delete(&self, value: &str) -> Result<(), AuthFailure> {
        let result = sqlx::query(
            r#"
            DELETE FROM refresh_tokens
            WHERE value = $1
            "#,
        )
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(internal)?;

        if result.rows_affected() == 0 {
            return Err(AuthFailure::NoTokenRecord("refresh token not found".into()));
        }

        Ok(())
    }

    async fn rotate(
        &self,
        old_value: &str,
        token: NewRefreshToken,
    ) -> Result<String, AuthFailure> {
        // Dropping the transaction on an early return rolls it back
        let mut tx = self.pool.begin().await.map_err(internal)?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM refresh_tokens
            WHERE value = $1
            "#,
        )
        .bind(old_value)
        .execute(&mut *tx)
        .await
        .map_err(internal)?;

        if deleted.rows_affected() == 0 {
            return Err(AuthFailure::NoTokenRecord("refresh token not found".into()));
        }

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (value, account_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&token.value)
        .bind(token.owner.0)
        .bind(token.expires_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            storage_failure(e, "refresh_tokens_pkey", || {
                AuthFailure::DuplicateToken("refresh token value already stored".into())
            })
        })?;

        tx.commit().await.map_err(internal)?;

        Ok(token.value)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthFailure> {
        let result = sqlx::query(
            r#"
            DELETE FROM refresh_tokens
            WHERE expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(internal)?;

        Ok(result.rows_affected())
    }
}
