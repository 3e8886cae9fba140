//! Accounts and registration rules.
//!
//! Uses BTreeMap-friendly id newtypes for deterministic iteration order in
//! the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// USER ID
// =============================================================================

/// Unique user identifier (UUID as bytes).
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct UserId(pub [u8; 16]);

impl UserId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().into_bytes())
    }

    /// Create from UUID string.
    pub fn from_uuid_str(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s).ok().map(|u| Self(*u.as_bytes()))
    }

    /// Convert to UUID string.
    pub fn to_uuid_string(&self) -> String {
        uuid::Uuid::from_bytes(self.0).to_string()
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

// =============================================================================
// ROLES & RECORDS
// =============================================================================

/// Account role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular player account.
    Player,
    /// Administrative account (seeded at startup).
    Admin,
}

/// A stored user account.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRecord {
    /// Account identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Salted credential digest (see `network::auth`). Never the password.
    pub credential: String,
    /// Account role.
    pub role: Role,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// REGISTRATION RULES
// =============================================================================

/// Special characters a password must draw from.
const PASSWORD_SPECIALS: &[char] = &['$', '%', '*', '@'];

/// Registration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Username shorter than 5 characters or not purely alphabetic.
    #[error("username must be at least 5 letters (A-Z, a-z only)")]
    InvalidUsername,

    /// Password shorter than 5 characters.
    #[error("password must be at least 5 characters")]
    PasswordTooShort,

    /// Password lacks a letter.
    #[error("password must contain at least one letter")]
    PasswordNeedsLetter,

    /// Password lacks a digit.
    #[error("password must contain at least one digit")]
    PasswordNeedsDigit,

    /// Password lacks a special character.
    #[error("password must contain at least one special character ($, %, *, @)")]
    PasswordNeedsSpecial,
}

/// Validate a username against the registration rules.
pub fn validate_username(username: &str) -> Result<(), RegistrationError> {
    let ok = username.chars().count() >= 5 && username.chars().all(|c| c.is_ascii_alphabetic());
    if ok {
        Ok(())
    } else {
        Err(RegistrationError::InvalidUsername)
    }
}

/// Validate a password against the registration rules.
pub fn validate_password(password: &str) -> Result<(), RegistrationError> {
    if password.chars().count() < 5 {
        return Err(RegistrationError::PasswordTooShort);
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(RegistrationError::PasswordNeedsLetter);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(RegistrationError::PasswordNeedsDigit);
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(&c)) {
        return Err(RegistrationError::PasswordNeedsSpecial);
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
