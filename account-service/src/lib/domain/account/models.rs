use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::domain::errors::AuthFailure;
use crate::domain::errors::EmailError;

/// Registered account.
///
/// `password_hash` is an opaque PHC string, compared only through the
/// password hasher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub email: EmailAddress,
    pub display_name: String,
    pub password_hash: String,
}

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    ///
    /// # Returns
    /// AccountId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an account ID from string.
    ///
    /// # Arguments
    /// * `s` - UUID string to parse
    ///
    /// # Errors
    /// * `InvalidUuidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, AuthFailure> {
        Uuid::parse_str(s)
            .map(AccountId)
            .map_err(|e| AuthFailure::InvalidUuidFormat(format!("{}: {}", s, e)))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Command to create a new account with domain types
#[derive(Debug)]
pub struct CreateAccountCommand {
    pub email: EmailAddress,
    pub display_name: String,
    pub password: String,
}

impl CreateAccountCommand {
    /// Construct a new create account command.
    ///
    /// # Arguments
    /// * `email` - Validated email address
    /// * `display_name` - Name shown for the account
    /// * `password` - Plain text password (will be hashed by service)
    pub fn new(email: EmailAddress, display_name: String, password: String) -> Self {
        Self {
            email,
            display_name,
            password,
        }
    }
}

/// Command to update an existing account.
///
/// Only provided fields will be updated.
#[derive(Debug, Default)]
pub struct UpdateAccountCommand {
    pub email: Option<EmailAddress>,
    pub display_name: Option<String>,
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_round_trip_through_string() {
        let id = AccountId::new();
        assert_eq!(AccountId::from_string(&id.to_string()), Ok(id));
    }

    #[test]
    fn test_account_id_rejects_malformed_input() {
        assert!(matches!(
            AccountId::from_string("not-a-uuid"),
            Err(AuthFailure::InvalidUuidFormat(_))
        ));
    }

    #[test]
    fn test_email_validation() {
        assert!(EmailAddress::new("a@x.com".to_string()).is_ok());
        assert!(matches!(
            EmailAddress::new("not-an-email".to_string()),
            Err(EmailError::InvalidFormat(_))
        ));
    }
}
