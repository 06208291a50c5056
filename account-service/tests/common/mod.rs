use std::sync::Arc;

use account_service::config::AuthConfig;
use account_service::domain::authorization::models::RotationPolicy;
use account_service::inbound::http::router::create_router;
use account_service::inbound::http::router::AppState;
use account_service::outbound::repositories::InMemoryStore;
use auth::PasswordHasher;
use auth::TokenSigner;
use serde_json::json;
use serde_json::Value;

pub const SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const PASSWORD: &str = "pass_word!";

/// Test application that spawns a real server over in-memory stores
pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryStore>,
    pub api_client: reqwest::Client,
    pub signer: TokenSigner,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with(RotationPolicy::Consume).await
    }

    pub async fn spawn_with(rotation: RotationPolicy) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let settings = AuthConfig {
            secret: SECRET.to_string(),
            access_ttl_seconds: 600,
            refresh_ttl_seconds: 3600,
            session_ttl_seconds: 3600,
            credential_ttl_seconds: 3600,
            rotation,
            purge_interval_seconds: 300,
        };
        let password_hasher =
            PasswordHasher::with_params(1024, 1, 1).expect("Failed to build password hasher");

        let store = Arc::new(InMemoryStore::new());
        let state = AppState::new(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&store),
            &settings,
            password_hasher,
        );
        let router = create_router(state);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            store,
            api_client: reqwest::Client::new(),
            signer: TokenSigner::new(SECRET.as_bytes()),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make PUT request
    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.put(format!("{}{}", self.address, path))
    }

    /// Helper to make DELETE request
    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(format!("{}{}", self.address, path))
    }

    /// Register an account and return its id
    pub async fn create_account(&self, email: &str) -> String {
        let response = self
            .post("/v1/users/new")
            .json(&json!({
                "email": email,
                "display_name": "Test User",
                "password": PASSWORD
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"]["id"]
            .as_str()
            .expect("Missing account id")
            .to_string()
    }

    /// Open a session and return its token
    pub async fn session_login(&self, email: &str) -> String {
        let body = self
            .login_body("/v1/session/login", email, PASSWORD)
            .await;
        body["data"]["token"]
            .as_str()
            .expect("Missing session token")
            .to_string()
    }

    /// Claim a token pair and return (access, refresh)
    pub async fn claim(&self, email: &str) -> (String, String) {
        let body = self.login_body("/v1/auth/claim", email, PASSWORD).await;
        (
            body["data"]["access_token"]
                .as_str()
                .expect("Missing access token")
                .to_string(),
            body["data"]["refresh_token"]
                .as_str()
                .expect("Missing refresh token")
                .to_string(),
        )
    }

    async fn login_body(&self, path: &str, email: &str, password: &str) -> Value {
        let response = self
            .post(path)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json().await.expect("Failed to parse response")
    }
}
