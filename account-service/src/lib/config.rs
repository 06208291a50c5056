use std::env;

use auth::PasswordError;
use auth::PasswordHasher;
use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::authorization::models::RotationPolicy;

/// HS256 keys shorter than the hash output weaken the signature.
pub const MIN_SECRET_BYTES: usize = 32;

/// Ten years. Keeps `now + ttl` and second-precision durations in range.
pub const MAX_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub password: PasswordConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

/// Signing secret, lifetimes and rotation policy.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub secret: String,
    #[serde(default = "default_access_ttl")]
    pub access_ttl_seconds: i64,
    #[serde(default = "default_long_ttl")]
    pub refresh_ttl_seconds: i64,
    #[serde(default = "default_long_ttl")]
    pub session_ttl_seconds: i64,
    #[serde(default = "default_long_ttl")]
    pub credential_ttl_seconds: i64,
    #[serde(default)]
    pub rotation: RotationPolicy,
    #[serde(default = "default_purge_interval")]
    pub purge_interval_seconds: u64,
}

impl AuthConfig {
    pub fn access_ttl(&self) -> Duration {
        Duration::seconds(self.access_ttl_seconds)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::seconds(self.refresh_ttl_seconds)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::seconds(self.session_ttl_seconds)
    }

    pub fn credential_ttl(&self) -> Duration {
        Duration::seconds(self.credential_ttl_seconds)
    }

    pub fn purge_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.purge_interval_seconds)
    }

    /// Reject settings that would weaken signing or break the purge timer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::Message(format!(
                "auth.secret must be at least {} bytes",
                MIN_SECRET_BYTES
            )));
        }

        for (key, seconds) in [
            ("access_ttl_seconds", self.access_ttl_seconds),
            ("refresh_ttl_seconds", self.refresh_ttl_seconds),
            ("session_ttl_seconds", self.session_ttl_seconds),
            ("credential_ttl_seconds", self.credential_ttl_seconds),
        ] {
            if !(1..=MAX_TTL_SECONDS).contains(&seconds) {
                return Err(ConfigError::Message(format!(
                    "auth.{} must be between 1 and {}, got {}",
                    key, MAX_TTL_SECONDS, seconds
                )));
            }
        }

        if self.purge_interval_seconds == 0 {
            return Err(ConfigError::Message(
                "auth.purge_interval_seconds must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub memory_cost_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_cost_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl PasswordConfig {
    pub fn hasher(&self) -> Result<PasswordHasher, PasswordError> {
        PasswordHasher::with_params(self.memory_cost_kib, self.iterations, self.parallelism)
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_access_ttl() -> i64 {
    600
}

fn default_long_ttl() -> i64 {
    3600
}

fn default_purge_interval() -> u64 {
    300
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, AUTH__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: AUTH__ROTATION=retain overrides auth.rotation
            .add_source(Environment::default().separator("__"))
            .build()?;

        Self::from_source(configuration)
    }

    fn from_source(configuration: ConfigBuilder) -> Result<Self, ConfigError> {
        let config: Self = configuration.try_deserialize()?;
        config.auth.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn from_toml(source: &str) -> Result<Config, ConfigError> {
        Config::from_source(
            ConfigBuilder::builder()
                .add_source(File::from_str(source, FileFormat::Toml))
                .build()?,
        )
    }

    fn with_auth(auth: &str) -> String {
        format!(
            r#"
            [database]
            url = "postgres://localhost/accounts"

            [server]
            http_port = 8080

            [auth]
            {}
            "#,
            auth
        )
    }

    const SECRET_LINE: &str = r#"secret = "config-test-secret-at-least-32-bytes""#;

    #[test]
    fn test_defaults_fill_optional_keys() {
        let config = from_toml(
            r#"
            [database]
            url = "postgres://localhost/accounts"

            [server]
            http_port = 8080

            [auth]
            secret = "config-test-secret-at-least-32-bytes"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.auth.access_ttl(), Duration::minutes(10));
        assert_eq!(config.auth.refresh_ttl(), Duration::hours(1));
        assert_eq!(config.auth.session_ttl(), Duration::hours(1));
        assert_eq!(config.auth.rotation, RotationPolicy::Consume);
        assert_eq!(config.auth.purge_interval().as_secs(), 300);
        assert_eq!(config.password.iterations, 2);
    }

    #[test]
    fn test_rotation_policy_parses() {
        let config = from_toml(
            r#"
            [database]
            url = "postgres://localhost/accounts"

            [server]
            http_port = 8080

            [auth]
            secret = "config-test-secret-at-least-32-bytes"
            rotation = "retain"
            access_ttl_seconds = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.auth.rotation, RotationPolicy::Retain);
        assert_eq!(config.auth.access_ttl(), Duration::seconds(60));
    }

    #[test]
    fn test_missing_secret_fails() {
        let result = from_toml(
            r#"
            [database]
            url = "postgres://localhost/accounts"

            [server]
            http_port = 8080

            [auth]
            "#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let error = from_toml(&with_auth(r#"secret = "s3cret""#)).unwrap_err();
        assert!(error.to_string().contains("auth.secret"));
    }

    #[test]
    fn test_non_positive_ttls_are_rejected() {
        for key in [
            "access_ttl_seconds",
            "refresh_ttl_seconds",
            "session_ttl_seconds",
            "credential_ttl_seconds",
        ] {
            for value in [0, -60] {
                let source = with_auth(&format!("{}\n{} = {}", SECRET_LINE, key, value));
                let error = from_toml(&source).unwrap_err();
                assert!(error.to_string().contains(key), "{}: {}", key, error);
            }
        }
    }

    #[test]
    fn test_oversized_ttl_is_rejected() {
        let source = with_auth(&format!(
            "{}\nrefresh_ttl_seconds = {}",
            SECRET_LINE,
            i64::MAX
        ));
        let error = from_toml(&source).unwrap_err();
        assert!(error.to_string().contains("refresh_ttl_seconds"));

        let source = with_auth(&format!(
            "{}\nrefresh_ttl_seconds = {}",
            SECRET_LINE, MAX_TTL_SECONDS
        ));
        assert!(from_toml(&source).is_ok());
    }

    #[test]
    fn test_zero_purge_interval_is_rejected() {
        let source = with_auth(&format!("{}\npurge_interval_seconds = 0", SECRET_LINE));
        let error = from_toml(&source).unwrap_err();
        assert!(error.to_string().contains("purge_interval_seconds"));
    }
}
