use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Longest accepted plaintext, in bytes.
///
/// Inputs above this are rejected, never truncated.
pub const MAX_PASSWORD_BYTES: usize = 72;

const UNKNOWN_ACCOUNT_SALT: &[u8] = b"unknown-account-salt";

/// Password hashing implementation.
///
/// Provides one-way salted hashing and constant-time verification
/// (internally uses Argon2id). The PHC output string carries its own
/// parameters and salt, so verification works across cost changes.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Create a new password hasher instance.
    ///
    /// # Returns
    /// PasswordHasher instance configured with secure defaults
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Create a password hasher with explicit Argon2id cost parameters.
    ///
    /// # Arguments
    /// * `memory_cost_kib` - Memory size in KiB
    /// * `iterations` - Number of passes
    /// * `parallelism` - Degree of parallelism
    ///
    /// # Errors
    /// * `InvalidParameters` - Parameters are outside Argon2's accepted range
    pub fn with_params(
        memory_cost_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordError> {
        let params = Params::new(memory_cost_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::InvalidParameters(e.to_string()))?;

        Ok(Self { params })
    }

    /// Hash a plaintext password securely.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `TooLong` - Password exceeds `MAX_PASSWORD_BYTES`
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordError::TooLong {
                max: MAX_PASSWORD_BYTES,
                actual: password.len(),
            });
        }

        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `hash` - Stored password hash in PHC string format
    ///
    /// # Errors
    /// * `Mismatch` - Password does not match the hash
    /// * `InvalidHash` - Stored hash is malformed or could not be checked
    pub fn verify(&self, password: &str, hash: &str) -> Result<(), PasswordError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

        match self.argon2().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(()),
            Err(argon2::password_hash::Error::Password) => Err(PasswordError::Mismatch),
            Err(e) => Err(PasswordError::InvalidHash(e.to_string())),
        }
    }

    /// Spend the cost of one `verify` when there is no stored hash to check.
    ///
    /// Lets callers answer "no such account" in about the time a wrong
    /// password takes. Always fails with `Mismatch`.
    pub fn verify_unknown(&self, password: &str) -> Result<(), PasswordError> {
        let mut output = [0u8; Params::DEFAULT_OUTPUT_LEN];
        // Only the elapsed work matters here, not the output
        let _ = self
            .argon2()
            .hash_password_into(password.as_bytes(), UNKNOWN_ACCOUNT_SALT, &mut output);

        Err(PasswordError::Mismatch)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::with_params(1024, 1, 1).expect("Failed to build hasher")
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast_hasher();
        let password = "my_secure_password";

        let hash = hasher.hash(password).expect("Failed to hash password");
        assert!(hash.starts_with("$argon2id$"));

        // Verify correct password
        assert!(hasher.verify(password, &hash).is_ok());

        // Verify incorrect password
        assert_eq!(
            hasher.verify("wrong_password", &hash),
            Err(PasswordError::Mismatch)
        );
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = fast_hasher();

        let first = hasher.hash("same_password").unwrap();
        let second = hasher.hash("same_password").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("same_password", &first).is_ok());
        assert!(hasher.verify("same_password", &second).is_ok());
    }

    #[test]
    fn test_hash_rejects_too_long_password() {
        let hasher = fast_hasher();
        let password = "a".repeat(MAX_PASSWORD_BYTES + 1);

        assert_eq!(
            hasher.hash(&password),
            Err(PasswordError::TooLong {
                max: MAX_PASSWORD_BYTES,
                actual: MAX_PASSWORD_BYTES + 1,
            })
        );
    }

    #[test]
    fn test_hash_accepts_password_at_ceiling() {
        let hasher = fast_hasher();
        let password = "b".repeat(MAX_PASSWORD_BYTES);

        let hash = hasher.hash(&password).expect("Failed to hash password");
        assert!(hasher.verify(&password, &hash).is_ok());
    }

    #[test]
    fn test_ceiling_counts_bytes_not_chars() {
        let hasher = fast_hasher();
        // 25 three-byte characters = 75 bytes
        let password = "あ".repeat(25);

        assert!(matches!(
            hasher.hash(&password),
            Err(PasswordError::TooLong { actual: 75, .. })
        ));
    }

    #[test]
    fn test_verify_unknown_always_mismatches() {
        let hasher = fast_hasher();
        let too_long = "c".repeat(MAX_PASSWORD_BYTES + 1);

        for password in ["", "password", too_long.as_str()] {
            assert_eq!(hasher.verify_unknown(password), Err(PasswordError::Mismatch));
        }
    }

    #[test]
    fn test_verify_hash_from_other_cost() {
        let strong = PasswordHasher::with_params(2048, 2, 1).unwrap();
        let hash = strong.hash("password").unwrap();

        assert!(fast_hasher().verify("password", &hash).is_ok());
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = fast_hasher();
        let result = hasher.verify("password", "invalid_hash");
        assert!(matches!(result, Err(PasswordError::InvalidHash(_))));
    }

    #[test]
    fn test_invalid_parameters() {
        let result = PasswordHasher::with_params(0, 0, 0);
        assert!(matches!(result, Err(PasswordError::InvalidParameters(_))));
    }
}
