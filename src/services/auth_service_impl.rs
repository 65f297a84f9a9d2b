//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use std::sync::Arc;

use crate::auth::{Role, RoleSet, TokenService};
use crate::db::Store;
use crate::services::auth_service::{AuthError, AuthService, LoginResult, Signup};
use crate::services::user_service::UserView;

pub struct SeaOrmAuthService {
    store: Store,
    tokens: Arc<TokenService>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(store: Store, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        let user = self
            .store
            .verify_credentials(email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let token = self
            .tokens
            .issue(user.id, &user.email, &user.roles)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(LoginResult {
            token,
            id: user.id,
            email: user.email,
            name: user.name,
            roles: user.roles.wire_names(),
        })
    }

    async fn signup(&self, request: Signup) -> Result<UserView, AuthError> {
        if self
            .store
            .find_user_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(AuthError::EmailAlreadyExists(request.email));
        }

        let roles: RoleSet = match &request.role_tags {
            Some(tags) if !tags.is_empty() => {
                tags.iter().map(|tag| Role::from_signup_tag(tag)).collect()
            }
            _ => RoleSet::user_only(),
        };

        let record = self
            .store
            .create_user(&request.name, &request.email, &request.password, &roles)
            .await?;

        Ok(UserView::from_parts(record, Vec::new()))
    }
}
