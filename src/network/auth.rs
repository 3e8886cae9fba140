//! Credentials and JWT session tokens.
//!
//! Passwords are stored as salted SHA-256 digests (`salt$digest`, both
//! hex). Login issues an HS256 JWT carrying the user id and role; later
//! requests on a fresh connection can re-authenticate with that token
//! instead of the password.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::game::user::{Role, UserId, UserRecord};

// =============================================================================
// PASSWORD HASHING
// =============================================================================

/// Hash a password with a fresh random salt.
///
/// Format: `<salt-hex>$<digest-hex>` where digest = SHA-256(salt || password).
pub fn hash_password(password: &str) -> String {
    let salt = uuid::Uuid::new_v4().into_bytes();

    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();

    format!("{}${}", hex::encode(salt), hex::encode(digest))
}

/// Verify a password against a stored `salt$digest` credential.
///
/// Unparseable credentials verify as false rather than erroring; a corrupt
/// record must never let a login through.
pub fn verify_password(credential: &str, password: &str) -> bool {
    let Some((salt_hex, digest_hex)) = credential.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(digest_hex) else {
        return false;
    };

    let mut hasher = Sha256::new();
    hasher.update(&salt);
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();

    digest.as_slice() == expected.as_slice()
}

// =============================================================================
// TOKENS
// =============================================================================

/// Authentication configuration.
#[derive(Clone, Debug, Default)]
pub struct AuthConfig {
    /// HS256 signing secret. Tokens cannot be issued or validated without it.
    pub secret: Option<String>,
    /// Issuer claim stamped into tokens and required on validation.
    pub issuer: Option<String>,
    /// Token lifetime in seconds.
    pub token_ttl_secs: u64,
    /// Whether to skip expiry validation (for testing only).
    pub skip_expiry: bool,
}

impl AuthConfig {
    /// Default token lifetime: 24 hours.
    pub const DEFAULT_TTL_SECS: u64 = 24 * 60 * 60;

    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            secret: std::env::var("AUTH_SECRET").ok(),
            issuer: std::env::var("AUTH_ISSUER").ok(),
            token_ttl_secs: std::env::var("AUTH_TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(Self::DEFAULT_TTL_SECS),
            skip_expiry: std::env::var("AUTH_SKIP_EXPIRY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }

    /// Check if token signing is configured.
    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }
}

/// Claims carried in a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject - the user id as a UUID string.
    pub sub: String,
    /// Account role.
    pub role: Role,
    /// Expiry timestamp (Unix seconds).
    #[serde(default)]
    pub exp: u64,
    /// Issued at timestamp.
    #[serde(default)]
    pub iat: u64,
    /// Issuer.
    #[serde(default)]
    pub iss: Option<String>,
}

impl TokenClaims {
    /// Parse the subject back into a `UserId`.
    pub fn user_id(&self) -> Option<UserId> {
        UserId::from_uuid_str(&self.sub)
    }
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No signing secret configured on server.
    #[error("authentication not configured")]
    NotConfigured,
    /// Token format is invalid.
    #[error("invalid token format")]
    InvalidFormat,
    /// Token signature verification failed.
    #[error("invalid signature")]
    InvalidSignature,
    /// Token has expired.
    #[error("token expired")]
    Expired,
    /// Issuer claim doesn't match expected value.
    #[error("invalid issuer")]
    InvalidIssuer,
    /// Subject claim is missing or not a UUID.
    #[error("invalid subject claim")]
    InvalidSubject,
    /// JWT decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Issue a session token for a logged-in user.
pub fn issue_token(user: &UserRecord, config: &AuthConfig) -> Result<String, AuthError> {
    let secret = config.secret.as_ref().ok_or(AuthError::NotConfigured)?;

    let now = unix_now();
    let claims = TokenClaims {
        sub: user.id.to_uuid_string(),
        role: user.role,
        exp: now + config.token_ttl_secs,
        iat: now,
        iss: config.issuer.clone(),
    };

    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&header, &claims, &key).map_err(|e| AuthError::DecodeError(e.to_string()))
}

/// Validate a session token and extract claims.
pub fn validate_token(token: &str, config: &AuthConfig) -> Result<TokenClaims, AuthError> {
    let secret = config.secret.as_ref().ok_or(AuthError::NotConfigured)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims = std::collections::HashSet::new();
    validation.validate_aud = false;

    if let Some(ref issuer) = config.issuer {
        validation.set_issuer(&[issuer]);
    }
    if config.skip_expiry {
        validation.validate_exp = false;
    }

    let key = DecodingKey::from_secret(secret.as_bytes());
    let token_data =
        decode::<TokenClaims>(token, &key, &validation).map_err(map_jwt_error)?;

    let claims = token_data.claims;

    if claims.user_id().is_none() {
        return Err(AuthError::InvalidSubject);
    }

    // Manual expiry check (in case validation was skipped)
    if !config.skip_expiry && claims.exp > 0 && unix_now() > claims.exp {
        return Err(AuthError::Expired);
    }

    Ok(claims)
}

/// Map JWT library errors to our error type.
fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
        ErrorKind::InvalidToken | ErrorKind::Base64(_) => AuthError::InvalidFormat,
        _ => AuthError::DecodeError(err.to_string()),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user() -> UserRecord {
        UserRecord {
            id: UserId::generate(),
            username: "alice".into(),
            credential: hash_password("abc1$"),
            role: Role::Player,
            created_at: Utc::now(),
        }
    }

    fn test_config() -> AuthConfig {
        AuthConfig {
            secret: Some("test-secret-key-256-bits-long!!".into()),
            issuer: None,
            token_ttl_secs: 3600,
            skip_expiry: false,
        }
    }

    #[test]
    fn test_hash_verify_roundtrip() {
        let credential = hash_password("pass9@word");
        assert!(verify_password(&credential, "pass9@word"));
        assert!(!verify_password(&credential, "pass9@wore"));
    }

    #[test]
    fn test_hash_salts_are_unique() {
        let a = hash_password("abc1$");
        let b = hash_password("abc1$");
        assert_ne!(a, b);
        assert!(verify_password(&a, "abc1$"));
        assert!(verify_password(&b, "abc1$"));
    }

    #[test]
    fn test_verify_rejects_corrupt_credential() {
        assert!(!verify_password("no-separator", "abc1$"));
        assert!(!verify_password("zz$zz", "abc1$"));
        assert!(!verify_password("", "abc1$"));
    }

    #[test]
    fn test_issue_and_validate_token() {
        let config = test_config();
        let user = test_user();

        let token = issue_token(&user, &config).unwrap();
        let claims = validate_token(&token, &config).unwrap();

        assert_eq!(claims.user_id(), Some(user.id));
        assert_eq!(claims.role, Role::Player);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let config = test_config();
        let user = test_user();
        let token = issue_token(&user, &config).unwrap();

        let other = AuthConfig {
            secret: Some("a-completely-different-secret!!".into()),
            ..test_config()
        };
        assert!(matches!(
            validate_token(&token, &other),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = test_config();
        let user = test_user();

        // Hand-craft a token that expired in 1970.
        let claims = TokenClaims {
            sub: user.id.to_uuid_string(),
            role: user.role,
            exp: 1,
            iat: 0,
            iss: None,
        };
        let key = EncodingKey::from_secret(config.secret.as_ref().unwrap().as_bytes());
        let token = encode(&Header::new(Algorithm::HS256), &claims, &key).unwrap();

        assert!(matches!(
            validate_token(&token, &config),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn test_skip_expiry_for_testing() {
        let config = AuthConfig {
            token_ttl_secs: 0,
            skip_expiry: true,
            ..test_config()
        };
        let user = test_user();
        let token = issue_token(&user, &config).unwrap();
        assert!(validate_token(&token, &config).is_ok());
    }

    #[test]
    fn test_issuer_validation() {
        let issuing = AuthConfig {
            issuer: Some("daily-word".into()),
            ..test_config()
        };
        let user = test_user();
        let token = issue_token(&user, &issuing).unwrap();

        assert!(validate_token(&token, &issuing).is_ok());

        let expecting_other = AuthConfig {
            issuer: Some("someone-else".into()),
            ..test_config()
        };
        assert!(matches!(
            validate_token(&token, &expecting_other),
            Err(AuthError::InvalidIssuer)
        ));
    }

    #[test]
    fn test_not_configured() {
        let config = AuthConfig::default();
        assert!(matches!(
            issue_token(&test_user(), &config),
            Err(AuthError::NotConfigured)
        ));
        assert!(matches!(
            validate_token("x.y.z", &config),
            Err(AuthError::NotConfigured)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let config = test_config();
        assert!(validate_token("not-a-jwt", &config).is_err());
    }
}
