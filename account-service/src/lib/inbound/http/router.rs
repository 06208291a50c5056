use std::sync::Arc;
use std::time::Duration;

use auth::PasswordHasher;
use auth::TokenSigner;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::claim_token::claim_token;
use super::handlers::create_account::create_account;
use super::handlers::delete_account::delete_account;
use super::handlers::get_account::get_account;
use super::handlers::list_accounts::list_accounts;
use super::handlers::login::login;
use super::handlers::refresh_token::refresh_token;
use super::handlers::revoke_token::revoke_token;
use super::handlers::session_login::session_login;
use super::handlers::session_logout::session_logout;
use super::handlers::update_account::update_account;
use super::middleware::require_access_owner;
use super::middleware::require_session_owner;
use crate::config::AuthConfig;
use crate::domain::account::ports::AccountServicePort;
use crate::domain::account::ports::AccountStore;
use crate::domain::account::service::AccountService;
use crate::domain::authorization::credential::CredentialAuthorizer;
use crate::domain::authorization::ports::CredentialAuthorizerPort;
use crate::domain::authorization::ports::SessionAuthorizationPort;
use crate::domain::authorization::ports::SessionStore;
use crate::domain::authorization::ports::TokenAuthorizationPort;
use crate::domain::authorization::ports::TokenStore;
use crate::domain::authorization::session::SessionAuthorization;
use crate::domain::authorization::token::TokenAuthorization;
use crate::domain::authorization::token::TokenLifetimes;

#[derive(Clone)]
pub struct AppState {
    pub account_service: Arc<dyn AccountServicePort>,
    pub credential_authorizer: Arc<dyn CredentialAuthorizerPort>,
    pub token_authorization: Arc<dyn TokenAuthorizationPort>,
    pub session_authorization: Arc<dyn SessionAuthorizationPort>,
}

impl AppState {
    /// Wire the services over the given stores.
    pub fn new<AS, TS, SS>(
        accounts: Arc<AS>,
        tokens: Arc<TS>,
        sessions: Arc<SS>,
        settings: &AuthConfig,
        password_hasher: PasswordHasher,
    ) -> Self
    where
        AS: AccountStore,
        TS: TokenStore,
        SS: SessionStore,
    {
        let signer = Arc::new(TokenSigner::new(settings.secret.as_bytes()));

        Self {
            account_service: Arc::new(AccountService::new(
                Arc::clone(&accounts),
                password_hasher.clone(),
            )),
            credential_authorizer: Arc::new(CredentialAuthorizer::new(
                Arc::clone(&accounts),
                Arc::clone(&signer),
                password_hasher.clone(),
                settings.credential_ttl(),
            )),
            token_authorization: Arc::new(TokenAuthorization::new(
                Arc::clone(&accounts),
                tokens,
                signer,
                password_hasher.clone(),
                TokenLifetimes {
                    access: settings.access_ttl(),
                    refresh: settings.refresh_ttl(),
                },
                settings.rotation,
            )),
            session_authorization: Arc::new(SessionAuthorization::new(
                accounts,
                sessions,
                password_hasher,
                settings.session_ttl(),
            )),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/v1/users", get(list_accounts))
        .route("/v1/users/new", post(create_account))
        .route("/v1/login", post(login))
        .route("/v1/session/login", post(session_login))
        .route("/v1/session/logout/:id", delete(session_logout))
        .route("/v1/auth/claim", post(claim_token))
        .route("/v1/auth/refresh", post(refresh_token))
        .route("/v1/auth/revoke", post(revoke_token));

    let session_routes = Router::new()
        .route(
            "/v1/session/users/:id",
            get(get_account).put(update_account).delete(delete_account),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session_owner,
        ));

    let token_routes = Router::new()
        .route(
            "/v1/auth/users/:id",
            get(get_account).put(update_account).delete(delete_account),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_access_owner,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            // Headers are left out: they carry bearer tokens
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(token_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
