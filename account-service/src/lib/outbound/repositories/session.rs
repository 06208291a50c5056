use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::internal;
use crate::domain::account::models::AccountId;
use crate::domain::authorization::models::NewSession;
use crate::domain::authorization::ports::SessionStore;
use crate::domain::errors::AuthFailure;

pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn register(&self, session: NewSession) -> Result<String, AuthFailure> {
        sqlx::query(
            r#"
            INSERT INTO sessions (account_id, token, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(session.owner.0)
        .bind(&session.token)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // Both the (owner, token) key and the token index mean a reused token
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AuthFailure::DuplicateToken("session token already stored".into());
                }
            }
            internal(e)
        })?;

        Ok(session.token)
    }

    async fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<bool, AuthFailure> {
        let live: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM sessions
                WHERE token = $1 AND expires_at > $2
            )
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(internal)?;

        Ok(live)
    }

    async fn find_owner(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AccountId>, AuthFailure> {
        let owner: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT account_id FROM sessions
            WHERE token = $1 AND expires_at > $2
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;

        Ok(owner.map(AccountId))
    }

    async fn delete(&self, owner: &AccountId, token: &str) -> Result<(), AuthFailure> {
        let result = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE account_id = $1 AND token = $2
            "#,
        )
        .bind(owner.0)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(internal)?;

        if result.rows_affected() == 0 {
            return Err(AuthFailure::NoSessionRecord(format!(
                "no session for account {}",
                owner
            )));
        }

        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthFailure> {
        let result = sqlx::query(
            r#"
            DELETE FROM sessions
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
