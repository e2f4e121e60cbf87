//! Bearer token issuance and validation.

use crate::core::Actor;
use crate::entities::user;
use crate::errors::{Error, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

/// Token signing settings
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC secret, at least 32 bytes
    pub secret: String,
    /// Token lifetime
    pub expiration_minutes: i64,
    /// Value of the `iss` claim
    pub issuer: String,
}

/// Claims carried by every token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Username at the time of issue
    pub username: String,
    /// Role name
    pub role: String,
    /// Expiry, seconds since the epoch
    pub exp: i64,
    /// Issued at, seconds since the epoch
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl TryFrom<Claims> for Actor {
    type Error = Error;

    fn try_from(claims: Claims) -> Result<Self> {
        let user_id = claims.sub.parse().map_err(|_| Error::Unauthorized {
            message: "Malformed token subject".to_string(),
        })?;
        Ok(Self {
            user_id,
            username: claims.username,
        })
    }
}

/// Signs and verifies HS256 tokens
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("expiration_minutes", &self.config.expiration_minutes)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// Builds a service from its configuration.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issues a token for `user`.
    pub fn generate_token(&self, user: &user::Model) -> Result<String> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.clone(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            Error::Internal {
                message: format!("Failed to sign token: {e}"),
            }
        })
    }

    /// Verifies signature, issuer and expiry and returns the claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let message = match e.kind() {
                    ErrorKind::ExpiredSignature => "Token has expired".to_string(),
                    ErrorKind::InvalidSignature => "Invalid token signature".to_string(),
                    _ => format!("Invalid token: {e}"),
                };
                Error::Unauthorized { message }
            })
    }

    /// Strips the `Bearer ` prefix from an `Authorization` header value.
    #[must_use]
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn service(expiration_minutes: i64) -> JwtService {
        JwtService::new(JwtConfig {
            secret: "0123456789abcdef0123456789abcdef".to_string(),
            expiration_minutes,
            issuer: "recipe-costing".to_string(),
        })
    }

    fn user() -> user::Model {
        user::Model {
            id: 7,
            username: "chef".to_string(),
            email: "chef@example.com".to_string(),
            password_hash: String::new(),
            first_name: None,
            last_name: None,
            phone: None,
            bio: None,
            profile_picture: None,
            role: "ROLE_USER".to_string(),
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_issue_and_validate() -> Result<()> {
        let jwt = service(60);
        let token = jwt.generate_token(&user())?;

        let claims = jwt.validate_token(&token)?;
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "chef");
        assert_eq!(claims.iss, "recipe-costing");

        let actor = Actor::try_from(claims)?;
        assert_eq!(actor.user_id, 7);
        Ok(())
    }

    #[test]
    fn test_expired_token_rejected() -> Result<()> {
        let jwt = service(-10);
        let token = jwt.generate_token(&user())?;
        assert!(matches!(
            jwt.validate_token(&token).unwrap_err(),
            Error::Unauthorized { .. }
        ));
        Ok(())
    }

    #[test]
    fn test_foreign_secret_rejected() -> Result<()> {
        let token = service(60).generate_token(&user())?;
        let other = JwtService::new(JwtConfig {
            secret: "ffffffffffffffffffffffffffffffff".to_string(),
            expiration_minutes: 60,
            issuer: "recipe-costing".to_string(),
        });
        assert!(other.validate_token(&token).is_err());
        Ok(())
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
        assert_eq!(JwtService::extract_from_header("Bearer "), None);
    }
}
