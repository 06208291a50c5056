use chrono::DateTime;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::decode_header;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::TokenError;

/// Signs and verifies self-contained access tokens.
///
/// Uses HS256 (HMAC with SHA-256) with a symmetric secret. Tokens are
/// signed, not encrypted: the claims are readable by anyone holding one.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenSigner {
    /// Create a new token signer with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Sign an access token for an account.
    ///
    /// # Arguments
    /// * `subject` - Account identifier
    /// * `email` - Account email
    /// * `issued_at` - Issue time
    /// * `expires_at` - Expiration time, must be at least one second after `issued_at`
    ///
    /// # Returns
    /// Compact JWT string
    ///
    /// # Errors
    /// * `SigningFailed` - Expiration is not after issue time, or encoding failed
    pub fn sign(
        &self,
        subject: &str,
        email: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(subject, email, issued_at, expires_at);

        if claims.exp <= claims.iat {
            return Err(TokenError::SigningFailed(format!(
                "expiration {} is not after issue time {}",
                claims.exp, claims.iat
            )));
        }

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }

    /// Verify a token and return its claims.
    ///
    /// Checks run in a fixed order: non-empty, parseable with the expected
    /// algorithm, signature, subject, then expiry.
    ///
    /// # Arguments
    /// * `token` - Compact JWT string
    /// * `now` - Current time
    ///
    /// # Errors
    /// * `EmptyToken` - Token is empty
    /// * `InvalidToken` - Malformed, wrong algorithm or bad signature
    /// * `InvalidSubject` - Subject claim is missing or empty
    /// * `ExpiredToken` - `now` is at or past the expiration claim
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        if token.is_empty() {
            return Err(TokenError::EmptyToken);
        }

        let header = decode_header(token).map_err(|e| TokenError::InvalidToken(e.to_string()))?;
        if header.alg != self.algorithm {
            return Err(TokenError::InvalidToken(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }

        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked last, against the caller's clock
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| TokenError::InvalidToken(e.to_string()))?
            .claims;

        if claims.sub.is_empty() {
            return Err(TokenError::InvalidSubject);
        }

        let current = now.timestamp();
        if claims.is_expired(current) {
            return Err(TokenError::ExpiredToken {
                expired_at: claims.exp,
                now: current,
            });
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use chrono::Duration;
    use chrono::TimeZone;
    use serde::Serialize;

    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn signed_token(signer: &TokenSigner) -> String {
        signer
            .sign("u1", "a@x.com", issued_at(), issued_at() + Duration::minutes(10))
            .expect("Failed to sign token")
    }

    #[test]
    fn test_sign_and_verify() {
        let signer = TokenSigner::new(SECRET);
        let token = signed_token(&signer);

        let claims = signer.verify(&token, issued_at()).expect("Failed to verify");
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.iat, issued_at().timestamp());
    }

    #[test]
    fn test_expired_exactly_at_expiration() {
        let signer = TokenSigner::new(SECRET);
        let token = signed_token(&signer);
        let expires_at = issued_at() + Duration::minutes(10);

        assert!(signer
            .verify(&token, expires_at - Duration::seconds(1))
            .is_ok());
        assert_eq!(
            signer.verify(&token, expires_at),
            Err(TokenError::ExpiredToken {
                expired_at: expires_at.timestamp(),
                now: expires_at.timestamp(),
            })
        );
        assert!(matches!(
            signer.verify(&token, expires_at + Duration::hours(1)),
            Err(TokenError::ExpiredToken { .. })
        ));
    }

    #[test]
    fn test_sign_rejects_non_increasing_expiry() {
        let signer = TokenSigner::new(SECRET);

        let result = signer.sign("u1", "a@x.com", issued_at(), issued_at());
        assert!(matches!(result, Err(TokenError::SigningFailed(_))));
    }

    #[test]
    fn test_verify_empty_token() {
        let signer = TokenSigner::new(SECRET);
        assert_eq!(signer.verify("", issued_at()), Err(TokenError::EmptyToken));
    }

    #[test]
    fn test_verify_garbage_token() {
        let signer = TokenSigner::new(SECRET);
        let result = signer.verify("invalid.token.here", issued_at());
        assert!(matches!(result, Err(TokenError::InvalidToken(_))));
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let signer1 = TokenSigner::new(b"secret1_at_least_32_bytes_long_key!");
        let signer2 = TokenSigner::new(b"secret2_at_least_32_bytes_long_key!");

        let token = signed_token(&signer1);

        let result = signer2.verify(&token, issued_at());
        assert!(matches!(result, Err(TokenError::InvalidToken(_))));
    }

    #[test]
    fn test_any_altered_character_is_rejected() {
        let signer = TokenSigner::new(SECRET);
        let token = signed_token(&signer);

        for (i, c) in token.char_indices().filter(|(_, c)| *c != '.') {
            let replacement = if c == 'A' { 'B' } else { 'A' };
            let mut altered = token.clone();
            altered.replace_range(i..i + 1, &replacement.to_string());

            let result = signer.verify(&altered, issued_at());
            assert!(
                matches!(result, Err(TokenError::InvalidToken(_))),
                "altering position {} yielded {:?}",
                i,
                result
            );
        }
    }

    #[test]
    fn test_tampered_expired_token_is_invalid_not_expired() {
        let signer = TokenSigner::new(SECRET);
        let token = signed_token(&signer);
        let mut tampered = token.clone();
        tampered.push('x');

        let result = signer.verify(&tampered, issued_at() + Duration::days(1));
        assert!(matches!(result, Err(TokenError::InvalidToken(_))));
    }

    #[test]
    fn test_rejects_none_algorithm() {
        let signer = TokenSigner::new(SECRET);
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::json!({
                "sub": "u1",
                "email": "a@x.com",
                "iat": issued_at().timestamp(),
                "exp": (issued_at() + Duration::minutes(10)).timestamp(),
            })
            .to_string(),
        );
        let token = format!("{}.{}.", header, payload);

        let result = signer.verify(&token, issued_at());
        assert!(matches!(result, Err(TokenError::InvalidToken(_))));
    }

    #[test]
    fn test_rejects_substituted_algorithm() {
        let signer = TokenSigner::new(SECRET);
        let expires_at = issued_at() + Duration::minutes(10);
        let claims = Claims::new("u1", "a@x.com", issued_at(), expires_at);
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        let result = signer.verify(&token, issued_at());
        assert!(matches!(result, Err(TokenError::InvalidToken(_))));
    }

    #[derive(Serialize)]
    struct AnonymousClaims {
        email: String,
        iat: i64,
        exp: i64,
    }

    #[test]
    fn test_rejects_missing_subject() {
        let signer = TokenSigner::new(SECRET);
        let claims = AnonymousClaims {
            email: "a@x.com".to_string(),
            iat: issued_at().timestamp(),
            exp: (issued_at() + Duration::minutes(10)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(
            signer.verify(&token, issued_at()),
            Err(TokenError::InvalidSubject)
        );
    }

    #[test]
    fn test_rejects_empty_subject_even_when_expired() {
        let signer = TokenSigner::new(SECRET);
        let token = signer
            .sign("", "a@x.com", issued_at(), issued_at() + Duration::minutes(10))
            .unwrap();

        assert_eq!(
            signer.verify(&token, issued_at() + Duration::days(1)),
            Err(TokenError::InvalidSubject)
        );
    }
}
