pub mod account;
pub mod memory;
pub mod session;
pub mod token;

pub use account::PostgresAccountStore;
pub use memory::InMemoryStore;
pub use session::PostgresSessionStore;
pub use token::PostgresTokenStore;

use crate::domain::errors::AuthFailure;

/// Map a sqlx failure, turning a unique violation on `constraint` into `on_conflict`.
pub(crate) fn storage_failure(
    err: sqlx::Error,
    constraint: &str,
    on_conflict: impl FnOnce() -> AuthFailure,
) -> AuthFailure {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some(constraint) {
            return on_conflict();
        }
    }
    AuthFailure::InternalServerErr(err.to_string())
}

pub(crate) fn internal(err: sqlx::Error) -> AuthFailure {
    AuthFailure::InternalServerErr(err.to_string())
}

#[cfg(test)]
mod tests {
    const MIGRATIONS: [(&str, &str); 3] = [
        (
            "accounts",
            include_str!("../../../migrations/20240101000000_create_accounts.sql"),
        ),
        (
            "refresh_tokens",
            include_str!("../../../migrations/20240101000001_create_refresh_tokens.sql"),
        ),
        (
            "sessions",
            include_str!("../../../migrations/20240101000002_create_sessions.sql"),
        ),
    ];

    #[test]
    fn test_every_table_records_creation_time() {
        for (table, sql) in MIGRATIONS {
            assert!(
                sql.contains("created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()"),
                "{} has no created_at column",
                table
            );
        }
    }
}
