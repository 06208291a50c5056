use std::collections::HashMap;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::ports::AccountStore;
use crate::domain::authorization::models::NewRefreshToken;
use crate::domain::authorization::models::NewSession;
use crate::domain::authorization::models::TokenOwner;
use crate::domain::authorization::ports::SessionStore;
use crate::domain::authorization::ports::TokenStore;
use crate::domain::errors::AuthFailure;

#[derive(Debug, Clone)]
struct Expiring {
    owner: AccountId,
    expires_at: DateTime<Utc>,
}

impl Expiring {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<AccountId, Account>,
    /// account ids, oldest first
    created: Vec<AccountId>,
    /// refresh value -> owner
    refresh_tokens: HashMap<String, Expiring>,
    /// session token -> owner
    sessions: HashMap<String, Expiring>,
}

impl State {
    fn email_taken(&self, email: &str, except: Option<&AccountId>) -> bool {
        self.accounts
            .values()
            .any(|a| a.email.as_str() == email && Some(&a.id) != except)
    }

    fn check_refresh_insert(&self, token: &NewRefreshToken) -> Result<(), AuthFailure> {
        if !self.accounts.contains_key(&token.owner) {
            return Err(AuthFailure::InternalServerErr(format!(
                "refresh token owner {} does not exist",
                token.owner
            )));
        }
        if self.refresh_tokens.contains_key(&token.value) {
            return Err(AuthFailure::DuplicateToken(
                "refresh token value already stored".into(),
            ));
        }
        Ok(())
    }

    fn store_refresh(&mut self, token: NewRefreshToken) -> String {
        self.refresh_tokens.insert(
            token.value.clone(),
            Expiring {
                owner: token.owner,
                expires_at: token.expires_at,
            },
        );
        token.value
    }
}

/// Process-local store for accounts, refresh tokens and sessions.
///
/// All three tables sit behind one lock so that an account delete and its
/// cascade are observed atomically.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn insert(&self, account: Account) -> Result<Account, AuthFailure> {
        let mut state = self.state.write().await;

        if state.email_taken(account.email.as_str(), None) {
            return Err(AuthFailure::DuplicateUserEmail(account.email.to_string()));
        }

        state.created.push(account.id);
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find(&self, id: &AccountId) -> Result<Option<Account>, AuthFailure> {
        Ok(self.state.read().await.accounts.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthFailure> {
        Ok(self
            .state
            .read()
            .await
            .accounts
            .values()
            .find(|a| a.email.as_str() == email)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Account>, AuthFailure> {
        let state = self.state.read().await;

        // Newest first, like the created_at ordering in Postgres
        Ok(state
            .created
            .iter()
            .rev()
            .filter_map(|id| state.accounts.get(id).cloned())
            .collect())
    }

    async fn update(&self, account: Account) -> Result<Account, AuthFailure> {
        let mut state = self.state.write().await;

        if !state.accounts.contains_key(&account.id) {
            return Err(AuthFailure::NoUserRecord(account.id.to_string()));
        }
        if state.email_taken(account.email.as_str(), Some(&account.id)) {
            return Err(AuthFailure::DuplicateUserEmail(account.email.to_string()));
        }

        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn delete(&self, id: &AccountId) -> Result<(), AuthFailure> {
        let mut state = self.state.write().await;

        if state.accounts.remove(id).is_none() {
            return Err(AuthFailure::NoUserRecord(id.to_string()));
        }

        state.created.retain(|c| c != id);
        state.refresh_tokens.retain(|_, t| t.owner != *id);
        state.sessions.retain(|_, s| s.owner != *id);
        Ok(())
    }
}

#[async_trait]
impl TokenStore for InMemoryStore {
    async fn insert(&self, token: NewRefreshToken) -> Result<String, AuthFailure> {
        let mut state = self.state.write().await;

        state.check_refresh_insert(&token)?;
        Ok(state.store_refresh(token))
    }

    async fn find_owner(
        &self,
        value: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<TokenOwner>, AuthFailure> {
        let state = self.state.read().await;

        Ok(state
            .refresh_tokens
            .get(value)
            .filter(|t| t.is_live(now))
            .and_then(|t| state.accounts.get(&t.owner))
            .map(|a| TokenOwner {
                id: a.id,
                email: a.email.to_string(),
            }))
    }

    async fn delete(&self, value: &str) -> Result<(), AuthFailure> {
        self.state
            .write()
            .await
            .refresh_tokens
            .remove(value)
            .map(|_| ())
            .ok_or_else(|| AuthFailure::NoTokenRecord("refresh token not found".into()))
    }

    async fn rotate(
        &self,
        old_value: &str,
        token: NewRefreshToken,
    ) -> Result<String, AuthFailure> {
        let mut state = self.state.write().await;

        if !state.refresh_tokens.contains_key(old_value) {
            return Err(AuthFailure::NoTokenRecord("refresh token not found".into()));
        }
        state.check_refresh_insert(&token)?;

        state.refresh_tokens.remove(old_value);
        Ok(state.store_refresh(token))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthFailure> {
        let mut state = self.state.write().await;
        let before = state.refresh_tokens.len();
        state.refresh_tokens.retain(|_, t| t.is_live(now));
        Ok((before - state.refresh_tokens.len()) as u64)
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn register(&self, session: NewSession) -> Result<String, AuthFailure> {
        let mut state = self.state.write().await;

        if !state.accounts.contains_key(&session.owner) {
            return Err(AuthFailure::InternalServerErr(format!(
                "session owner {} does not exist",
                session.owner
            )));
        }
        if state.sessions.contains_key(&session.token) {
            return Err(AuthFailure::DuplicateToken(
                "session token already stored".into(),
            ));
        }

        state.sessions.insert(
            session.token.clone(),
            Expiring {
                owner: session.owner,
                expires_at: session.expires_at,
            },
        );
        Ok(session.token)
    }

    async fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<bool, AuthFailure> {
        Ok(self
            .state
            .read()
            .await
            .sessions
            .get(token)
            .is_some_and(|s| s.is_live(now)))
    }

    async fn find_owner(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AccountId>, AuthFailure> {
        Ok(self
            .state
            .read()
            .await
            .sessions
            .get(token)
            .filter(|s| s.is_live(now))
            .map(|s| s.owner))
    }

    async fn delete(&self, owner: &AccountId, token: &str) -> Result<(), AuthFailure> {
        let mut state = self.state.write().await;

        match state.sessions.get(token) {
            Some(s) if s.owner == *owner => {
                state.sessions.remove(token);
                Ok(())
            }
            _ => Err(AuthFailure::NoSessionRecord(format!(
                "no session for account {}",
                owner
            ))),
        }
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthFailure> {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| s.is_live(now));
        Ok((before - state.sessions.len()) as u64)
    }
}
