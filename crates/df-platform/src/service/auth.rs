//! Access Token Service
//!
//! Mints and verifies short-lived, self-contained HS256 access tokens.
//! Verification is stateless: signature plus expiry, no storage
//! round-trip. The trade-off is that an access token cannot be revoked
//! before its TTL elapses, which is why the TTL is short.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{Role, User};
use crate::error::{PlatformError, Result};

/// Auth service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Symmetric signing key, held only by the issuer
    pub secret_key: String,
    /// JWT issuer claim
    pub issuer: String,
    /// Access token TTL in seconds
    pub access_token_expiry_secs: i64,
    /// Refresh token validity window in seconds
    pub refresh_token_expiry_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: "dealflow-dev-secret-change-me".to_string(),
            issuer: "dealflow".to_string(),
            access_token_expiry_secs: 900,
            refresh_token_expiry_secs: 7 * 24 * 60 * 60,
        }
    }
}

/// Claims embedded in an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject: username
    pub sub: String,
    pub role: Role,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
    pub iss: String,
}

pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&config.issuer]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret_key.as_bytes()),
            validation,
            config,
        }
    }

    /// Issue an access token for a user. No side effects.
    pub fn generate_access_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: user.username.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.config.access_token_expiry_secs)).timestamp(),
            iss: self.config.issuer.clone(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| PlatformError::internal(format!("Token signing failed: {}", e)))
    }

    /// Verify a token and return its claims.
    ///
    /// Structural, signature, and expiry failures all collapse into
    /// `InvalidToken` so the caller cannot probe which check failed.
    pub fn validate_token(&self, token: &str) -> Result<AccessTokenClaims> {
        jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| PlatformError::InvalidToken)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ").filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(AuthConfig {
            secret_key: "test-secret".to_string(),
            ..AuthConfig::default()
        })
    }

    fn user(role: Role) -> User {
        User::new("alice", "alice@example.com", "$argon2id$stub", role)
    }

    #[test]
    fn test_claims_round_trip() {
        let svc = service();
        let token = svc.generate_access_token(&user(Role::Admin)).unwrap();
        let claims = svc.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let svc = service();
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: "alice".to_string(),
            role: Role::User,
            iat: (now - Duration::seconds(200)).timestamp(),
            exp: (now - Duration::seconds(100)).timestamp(),
            iss: "dealflow".to_string(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(matches!(
            svc.validate_token(&token),
            Err(PlatformError::InvalidToken)
        ));
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let svc = service();
        let token = svc.generate_access_token(&user(Role::User)).unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        assert!(matches!(
            svc.validate_token(&tampered),
            Err(PlatformError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_key_is_invalid() {
        let svc = service();
        let other = AuthService::new(AuthConfig {
            secret_key: "other-secret".to_string(),
            ..AuthConfig::default()
        });
        let token = other.generate_access_token(&user(Role::User)).unwrap();
        // Same collapsed failure as a malformed or expired token.
        assert!(matches!(
            svc.validate_token(&token),
            Err(PlatformError::InvalidToken)
        ));
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let svc = service();
        assert!(matches!(
            svc.validate_token("not-a-jwt"),
            Err(PlatformError::InvalidToken)
        ));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Basic abc123"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("abc123"), None);
    }
}
