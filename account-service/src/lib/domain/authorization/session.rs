use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::domain::account::models::AccountId;
use crate::domain::account::ports::AccountStore;
use crate::domain::authorization::credential::authenticate_account;
use crate::domain::authorization::models::NewSession;
use crate::domain::authorization::ports::SessionAuthorizationPort;
use crate::domain::authorization::ports::SessionStore;
use crate::domain::errors::ApplicationError;
use crate::domain::errors::AuthFailure;
use crate::domain::errors::UseCase;
use crate::domain::errors::WithUseCase;

/// Stateful authorization backed by stored sessions.
pub struct SessionAuthorization<AS, SS>
where
    AS: AccountStore,
    SS: SessionStore,
{
    accounts: Arc<AS>,
    sessions: Arc<SS>,
    password_hasher: PasswordHasher,
    expiration: Duration,
}

impl<AS, SS> SessionAuthorization<AS, SS>
where
    AS: AccountStore,
    SS: SessionStore,
{
    pub fn new(
        accounts: Arc<AS>,
        sessions: Arc<SS>,
        password_hasher: PasswordHasher,
        expiration: Duration,
    ) -> Self {
        Self {
            accounts,
            sessions,
            password_hasher,
            expiration,
        }
    }
}

fn no_session(use_case: UseCase, detail: impl Into<String>) -> ApplicationError {
    ApplicationError::new(use_case, AuthFailure::NoSessionRecord(detail.into()))
}

#[async_trait]
impl<AS, SS> SessionAuthorizationPort for SessionAuthorization<AS, SS>
where
    AS: AccountStore,
    SS: SessionStore,
{
    async fn sign(
        &self,
        email: &str,
        password: &str,
        new_session_token: &str,
        now: DateTime<Utc>,
    ) -> Result<String, ApplicationError> {
        let account =
            authenticate_account(self.accounts.as_ref(), &self.password_hasher, email, password)
                .await
                .map_err(|e| {
                    tracing::warn!(reason = %e, "Session login rejected");
                    ApplicationError::new(UseCase::FailedLogin, e)
                })?;

        let token = self
            .sessions
            .register(NewSession {
                owner: account.id,
                token: new_session_token.to_string(),
                expires_at: now + self.expiration,
            })
            .await
            .with_use_case(UseCase::FailedLogin)?;

        tracing::info!(account_id = %account.id, "Session registered");
        Ok(token)
    }

    async fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<(), ApplicationError> {
        let live = self
            .sessions
            .verify(token, now)
            .await
            .with_use_case(UseCase::FailedCheckLogin)?;

        if live {
            Ok(())
        } else {
            Err(no_session(UseCase::FailedCheckLogin, "session missing or expired"))
        }
    }

    async fn find_owner(
        &self,
        claimed_owner: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AccountId, ApplicationError> {
        // A malformed id can never own a session
        let claimed = AccountId::from_string(claimed_owner).map_err(|_| {
            no_session(
                UseCase::InvalidLoginSession,
                format!("malformed owner {claimed_owner}"),
            )
        })?;

        let owner = self
            .sessions
            .find_owner(token, now)
            .await
            .with_use_case(UseCase::InvalidLoginSession)?
            .ok_or_else(|| {
                no_session(UseCase::InvalidLoginSession, "session missing or expired")
            })?;

        if owner != claimed {
            tracing::warn!(owner = %owner, claimed = %claimed, "Session owner mismatch");
            return Err(no_session(
                UseCase::InvalidLoginSession,
                format!("session owned by {owner}, not {claimed}"),
            ));
        }

        Ok(owner)
    }

    async fn sign_out(&self, owner: &str, token: &str) -> Result<(), ApplicationError> {
        let owner = AccountId::from_string(owner)
            .map_err(|_| no_session(UseCase::FailedLogout, format!("malformed owner {owner}")))?;

        self.sessions
            .delete(&owner, token)
            .await
            .with_use_case(UseCase::FailedLogout)?;

        tracing::info!(account_id = %owner, "Session signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use mockall::mock;

    use super::*;
    use crate::domain::account::models::Account;
    use crate::domain::account::models::EmailAddress;
    use crate::outbound::repositories::memory::InMemoryStore;

    mock! {
        pub TestSessionStore {}

        #[async_trait]
        impl SessionStore for TestSessionStore {
            async fn register(&self, session: NewSession) -> Result<String, AuthFailure>;
            async fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<bool, AuthFailure>;
            async fn find_owner(&self, token: &str, now: DateTime<Utc>) -> Result<Option<AccountId>, AuthFailure>;
            async fn delete(&self, owner: &AccountId, token: &str) -> Result<(), AuthFailure>;
            async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthFailure>;
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn hasher() -> PasswordHasher {
        PasswordHasher::with_params(1024, 1, 1).unwrap()
    }

    async fn add_account(store: &InMemoryStore, email: &str) -> Account {
        let account = Account {
            id: AccountId::new(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            display_name: "Someone".to_string(),
            password_hash: hasher().hash("pw").unwrap(),
        };
        AccountStore::insert(store, account.clone()).await.unwrap();
        account
    }

    fn authorization(
        store: &Arc<InMemoryStore>,
    ) -> SessionAuthorization<InMemoryStore, InMemoryStore> {
        SessionAuthorization::new(
            Arc::clone(store),
            Arc::clone(store),
            hasher(),
            Duration::hours(1),
        )
    }

    #[tokio::test]
    async fn test_sign_verify_and_find_owner() {
        let store = Arc::new(InMemoryStore::new());
        let account = add_account(&store, "a@x.com").await;
        let authorization = authorization(&store);

        let token = authorization.sign("a@x.com", "pw", "s1", t0()).await.unwrap();
        assert_eq!(token, "s1");

        assert!(authorization.verify("s1", t0()).await.is_ok());
        let owner = authorization
            .find_owner(&account.id.to_string(), "s1", t0())
            .await
            .unwrap();
        assert_eq!(owner, account.id);
    }

    #[tokio::test]
    async fn test_sign_failures_look_alike() {
        let store = Arc::new(InMemoryStore::new());
        add_account(&store, "a@x.com").await;
        let authorization = authorization(&store);

        let unknown = authorization
            .sign("b@x.com", "pw", "s1", t0())
            .await
            .unwrap_err();
        let wrong = authorization
            .sign("a@x.com", "nope", "s1", t0())
            .await
            .unwrap_err();

        assert_eq!(unknown.use_case(), UseCase::FailedLogin);
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert!(authorization.verify("s1", t0()).await.is_err());
    }

    #[tokio::test]
    async fn test_verify_expired_session() {
        let store = Arc::new(InMemoryStore::new());
        add_account(&store, "a@x.com").await;
        let authorization = authorization(&store);
        authorization.sign("a@x.com", "pw", "s1", t0()).await.unwrap();

        let error = authorization
            .verify("s1", t0() + Duration::hours(1))
            .await
            .unwrap_err();
        assert_eq!(error.use_case(), UseCase::FailedCheckLogin);
        assert!(matches!(error.cause(), AuthFailure::NoSessionRecord(_)));
    }

    #[tokio::test]
    async fn test_find_owner_rejects_other_account() {
        let store = Arc::new(InMemoryStore::new());
        let alice = add_account(&store, "a@x.com").await;
        let bob = add_account(&store, "b@x.com").await;
        let authorization = authorization(&store);
        authorization.sign("a@x.com", "pw", "s1", t0()).await.unwrap();

        let error = authorization
            .find_owner(&bob.id.to_string(), "s1", t0())
            .await
            .unwrap_err();
        assert_eq!(error.use_case(), UseCase::InvalidLoginSession);
        assert!(matches!(error.cause(), AuthFailure::NoSessionRecord(_)));

        let malformed = authorization
            .find_owner("not-a-uuid", "s1", t0())
            .await
            .unwrap_err();
        assert!(matches!(malformed.cause(), AuthFailure::NoSessionRecord(_)));

        assert!(authorization
            .find_owner(&alice.id.to_string(), "s1", t0())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_sign_out_is_not_repeatable() {
        let store = Arc::new(InMemoryStore::new());
        let account = add_account(&store, "a@x.com").await;
        let authorization = authorization(&store);
        authorization.sign("a@x.com", "pw", "s1", t0()).await.unwrap();

        let owner = account.id.to_string();
        assert!(authorization.sign_out(&owner, "s1").await.is_ok());

        let error = authorization.sign_out(&owner, "s1").await.unwrap_err();
        assert_eq!(error.use_case(), UseCase::FailedLogout);
        assert!(matches!(error.cause(), AuthFailure::NoSessionRecord(_)));

        assert!(authorization.verify("s1", t0()).await.is_err());
    }

    #[tokio::test]
    async fn test_sign_out_requires_matching_owner() {
        let store = Arc::new(InMemoryStore::new());
        add_account(&store, "a@x.com").await;
        let bob = add_account(&store, "b@x.com").await;
        let authorization = authorization(&store);
        authorization.sign("a@x.com", "pw", "s1", t0()).await.unwrap();

        let error = authorization
            .sign_out(&bob.id.to_string(), "s1")
            .await
            .unwrap_err();
        assert!(matches!(error.cause(), AuthFailure::NoSessionRecord(_)));
        assert!(authorization.verify("s1", t0()).await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_session_token() {
        let store = Arc::new(InMemoryStore::new());
        add_account(&store, "a@x.com").await;
        let authorization = authorization(&store);
        authorization.sign("a@x.com", "pw", "s1", t0()).await.unwrap();

        let error = authorization
            .sign("a@x.com", "pw", "s1", t0())
            .await
            .unwrap_err();
        assert!(matches!(error.cause(), AuthFailure::DuplicateToken(_)));
    }

    #[tokio::test]
    async fn test_storage_failure_on_verify_is_internal() {
        let store = Arc::new(InMemoryStore::new());
        let mut sessions = MockTestSessionStore::new();
        sessions
            .expect_verify()
            .times(1)
            .returning(|_, _| Err(AuthFailure::InternalServerErr("pool timed out".into())));

        let authorization =
            SessionAuthorization::new(store, Arc::new(sessions), hasher(), Duration::hours(1));

        let error = authorization.verify("s1", t0()).await.unwrap_err();
        assert_eq!(error.use_case(), UseCase::FailedCheckLogin);
        assert!(error.is_internal());
    }
}
