//! Domain service for login and self-service signup.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::services::user_service::UserView;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already in use: {0}")]
    EmailAlreadyExists(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Login result: the bearer token plus the identity it encodes.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub id: i64,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
}

/// Signup request. Role tags are free-form on the wire: `admin` grants
/// ADMIN, anything else (or nothing) grants USER.
#[derive(Debug, Clone)]
pub struct Signup {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role_tags: Option<Vec<String>>,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and issues a stateless token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email or
    /// a wrong password, indistinguishably.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError>;

    async fn signup(&self, request: Signup) -> Result<UserView, AuthError>;
}
