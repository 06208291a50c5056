use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;

use crate::domain::account::models::AccountId;

/// Access and refresh token issued together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Refresh token row to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRefreshToken {
    pub owner: AccountId,
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

/// Account that owns a live refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenOwner {
    pub id: AccountId,
    pub email: String,
}

/// Session row to persist, keyed by (owner, token).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub owner: AccountId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// What happens to the presented refresh token when a new one is issued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    /// The old value is deleted before the new one is stored; each refresh
    /// token can be exchanged once.
    #[default]
    Consume,
    /// The old value stays usable until it expires.
    Retain,
}
