//! Authentication utilities library
//!
//! Provides the credential primitives used by the account service:
//! - Password hashing (Argon2id, 72-byte ceiling)
//! - Access token signing and verification (HS256 JWT)
//!
//! Neither primitive knows about accounts or storage; services compose them
//! with their own persistence ports.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::with_params(1024, 1, 1).unwrap();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).is_ok());
//! assert!(hasher.verify("other_password", &hash).is_err());
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::TokenSigner;
//! use chrono::Duration;
//! use chrono::Utc;
//!
//! let signer = TokenSigner::new(b"secret_key_at_least_32_bytes_long!");
//! let now = Utc::now();
//! let token = signer
//!     .sign("user123", "alice@example.com", now, now + Duration::minutes(10))
//!     .unwrap();
//! let claims = signer.verify(&token, now).unwrap();
//! assert_eq!(claims.sub, "user123");
//! ```

pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use jwt::Claims;
pub use jwt::TokenError;
pub use jwt::TokenSigner;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::MAX_PASSWORD_BYTES;
