//! Stateless identity tokens (HS256 JWT).
//!
//! The signing key is injected at construction from configuration;
//! there is no revocation, a token stays valid until expiry.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::RoleSet;

/// Classification outcomes for `validate`. Attacker-controlled input
/// must land in one of these, never a panic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is malformed")]
    Malformed,
}

/// Verified token payload as the rest of the app consumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Claims {
    pub subject_id: i64,
    pub email: String,
    pub roles: RoleSet,
    pub expires_at: i64,
}

/// Wire-level claims as encoded into the token.
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: i64,
    email: String,
    roles: Vec<String>,
    iat: i64,
    exp: i64,
    jti: String,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Default leeway is 60s; expiry checks should be exact.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issues a signed token for the given identity.
    pub fn issue(&self, subject_id: i64, email: &str, roles: &RoleSet) -> anyhow::Result<String> {
        let now = Utc::now();
        let claims = WireClaims {
            sub: subject_id,
            email: email.to_string(),
            roles: roles.wire_names(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verifies signature and expiry, returning the decoded claims.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<WireClaims>(token, &self.decoding_key, &self.validation).map_err(
            |err| match err.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            },
        )?;

        let wire = data.claims;
        Ok(Claims {
            subject_id: wire.sub,
            email: wire.email,
            roles: RoleSet::from_wire_names(wire.roles.iter().map(String::as_str)),
            expires_at: wire.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    fn service() -> TokenService {
        TokenService::new("test-signing-key", 24)
    }

    #[test]
    fn issue_then_validate_round_trips_identity() {
        let svc = service();
        let roles: RoleSet = [Role::User, Role::Admin].into_iter().collect();
        let token = svc.issue(42, "ana@example.com", &roles).unwrap();

        let claims = svc.validate(&token).unwrap();
        assert_eq!(claims.subject_id, 42);
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.roles, roles);
    }

    #[test]
    fn tampered_signature_is_classified() {
        let svc = service();
        let token = svc.issue(1, "a@x.com", &RoleSet::user_only()).unwrap();

        // Flip one character inside the signature segment, keeping the
        // result valid base64url so the failure is the signature check.
        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[sig_start] = if bytes[sig_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert_eq!(svc.validate(&tampered), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn wrong_key_is_invalid_signature() {
        let token = service().issue(1, "a@x.com", &RoleSet::user_only()).unwrap();
        let other = TokenService::new("different-key", 24);
        assert_eq!(other.validate(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn expired_token_is_classified() {
        let svc = TokenService::new("test-signing-key", -1);
        let token = svc.issue(1, "a@x.com", &RoleSet::user_only()).unwrap();
        assert_eq!(service().validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn garbage_input_is_malformed() {
        let svc = service();
        assert_eq!(svc.validate(""), Err(TokenError::Malformed));
        assert_eq!(svc.validate("not.a.jwt"), Err(TokenError::Malformed));
        assert_eq!(svc.validate("a.b"), Err(TokenError::Malformed));
    }
}
