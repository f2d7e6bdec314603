//! User model
//!
//! A registered account. The password hash never leaves the process over
//! HTTP; handlers return [`UserProfile`] instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::UserId;

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,

    /// Login name, unique across the store
    pub username: String,

    pub email: String,

    /// Argon2 PHC string
    pub password_hash: String,

    /// Inactive users cannot log in
    #[serde(default = "default_active")]
    pub is_active: bool,

    /// When the user registered
    pub created_at: DateTime<Utc>,

    /// When the user was last modified
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl User {
    /// Create a new active user
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Public view of the account
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            is_active: self.is_active,
        }
    }

    /// Validate the user
    pub fn validate(&self) -> Result<(), UserValidationError> {
        validate_username(&self.username)?;
        validate_email(&self.email)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.username)
    }
}

/// What the API exposes about a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_active: bool,
}

pub fn validate_username(username: &str) -> Result<(), UserValidationError> {
    let len = username.chars().count();
    if len < 3 {
        return Err(UserValidationError::UsernameTooShort(len));
    }
    if len > 50 {
        return Err(UserValidationError::UsernameTooLong(len));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(UserValidationError::UsernameWhitespace);
    }
    Ok(())
}

/// Minimal shape check: exactly one `@`, something on each side, a dot in the domain
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.len() > 255 {
        return Err(UserValidationError::EmailTooLong(email.len()));
    }
    let mut parts = email.split('@');
    let valid = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !email.chars().any(char::is_whitespace)
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(UserValidationError::InvalidEmail(email.to_string()))
    }
}

/// Validation errors for users
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    UsernameTooShort(usize),
    UsernameTooLong(usize),
    UsernameWhitespace,
    InvalidEmail(String),
    EmailTooLong(usize),
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UsernameTooShort(len) => {
                write!(f, "Username too short ({} chars, min 3)", len)
            }
            Self::UsernameTooLong(len) => {
                write!(f, "Username too long ({} chars, max 50)", len)
            }
            Self::UsernameWhitespace => write!(f, "Username cannot contain whitespace"),
            Self::InvalidEmail(email) => write!(f, "Invalid email address: {}", email),
            Self::EmailTooLong(len) => write!(f, "Email too long ({} chars, max 255)", len),
        }
    }
}

impl std::error::Error for UserValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user() {
        let user = User::new("alice", "alice@example.com", "$argon2id$stub");
        assert!(user.is_active);
        assert_eq!(user.created_at, user.updated_at);
        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_username_rules() {
        assert_eq!(
            validate_username("al"),
            Err(UserValidationError::UsernameTooShort(2))
        );
        assert!(matches!(
            validate_username(&"a".repeat(51)),
            Err(UserValidationError::UsernameTooLong(51))
        ));
        assert_eq!(
            validate_username("al ice"),
            Err(UserValidationError::UsernameWhitespace)
        );
        assert!(validate_username("alice_99").is_ok());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@localhost").is_err());
        assert!(validate_email("a@.com").is_err());
    }

    #[test]
    fn test_profile_hides_hash() {
        let user = User::new("alice", "alice@example.com", "secret-hash");
        let json = serde_json::to_string(&user.profile()).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"is_active\":true"));
    }

    #[test]
    fn test_missing_is_active_defaults_true() {
        let user = User::new("alice", "alice@example.com", "h");
        let mut value = serde_json::to_value(&user).unwrap();
        value.as_object_mut().unwrap().remove("is_active");
        let loaded: User = serde_json::from_value(value).unwrap();
        assert!(loaded.is_active);
    }
}
