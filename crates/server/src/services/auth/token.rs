//! Bearer tokens (HS256 JWT).

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use helpdesk_core::{UserId, UserRole};

use crate::config::{JwtConfig, MAX_TOKEN_TTL_HOURS};
use crate::models::User;

/// Token payload handed to protected handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: UserId,
    pub email: String,
    pub role: UserRole,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// Token errors.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Token could not be signed.
    #[error("failed to sign token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    /// Token is malformed, has a bad signature, or has expired.
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Signing and verification keys derived from one shared secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    /// Build keys from configuration.
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: token_ttl(config.ttl_hours),
        }
    }

    /// Issue a token for `user`, valid for the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encode` if signing fails.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            email: user.email.as_str().to_owned(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        self.sign(&claims)
    }

    /// Sign arbitrary claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encode` if signing fails.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::default(), claims, &self.encoding).map_err(TokenError::Encode)
    }

    /// Verify signature and expiry, returning the claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` for any malformed, forged or expired token.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

/// Token lifetime, clamped to the range configuration accepts.
fn token_ttl(hours: i64) -> Duration {
    Duration::try_hours(hours.clamp(1, MAX_TOKEN_TTL_HOURS)).unwrap_or_else(Duration::zero)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use helpdesk_core::Email;
    use secrecy::SecretString;

    use super::*;

    fn keys(secret: &str) -> TokenKeys {
        TokenKeys::new(&JwtConfig {
            secret: SecretString::from(secret),
            ttl_hours: 1,
        })
    }

    fn user() -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            name: "Ravi Kumar".to_string(),
            email: Email::parse("ravi@powergrid.in").unwrap(),
            employee_id: None,
            role: UserRole::Support,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let keys = keys("Zq8#vL2!pR6@wX1$kT9^mN4&bH7*cJ3%");
        let user = user();
        let claims = keys.verify(&keys.issue(&user).unwrap()).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, UserRole::Support);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_out_of_range_ttl_does_not_panic() {
        let keys = TokenKeys::new(&JwtConfig {
            secret: SecretString::from("Zq8#vL2!pR6@wX1$kT9^mN4&bH7*cJ3%"),
            ttl_hours: i64::MAX,
        });
        let claims = keys.verify(&keys.issue(&user()).unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, MAX_TOKEN_TTL_HOURS * 3600);

        assert_eq!(token_ttl(-3), Duration::hours(1));
    }

    #[test]
    fn test_rejects_other_secret() {
        let token = keys("Zq8#vL2!pR6@wX1$kT9^mN4&bH7*cJ3%").issue(&user()).unwrap();
        let result = keys("Yt5%uG8!eD3@sA6$qW1^zX4&cV7*bN2#").verify(&token);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_rejects_expired() {
        let keys = keys("Zq8#vL2!pR6@wX1$kT9^mN4&bH7*cJ3%");
        let issued = Utc::now() - Duration::hours(3);
        let claims = Claims {
            sub: UserId::new(),
            email: "ravi@powergrid.in".to_string(),
            role: UserRole::Employee,
            iat: issued.timestamp(),
            exp: (issued + Duration::hours(1)).timestamp(),
        };
        let token = keys.sign(&claims).unwrap();

        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(keys("Zq8#vL2!pR6@wX1$kT9^mN4&bH7*cJ3%").verify("not.a.jwt").is_err());
    }
}
