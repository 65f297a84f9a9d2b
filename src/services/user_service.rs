//! Domain service for user accounts and their nested addresses.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::auth::RoleSet;
use crate::db::paging::{Page, PageRequest};
use crate::db::repositories::UserRecord;
use crate::services::address_service::{AddressView, NewAddress};
use crate::services::cep_service::CepError;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Email already in use: {0}")]
    EmailAlreadyExists(String),

    #[error("User {0} not found")]
    NotFound(i64),

    /// Pre-flight normalization failed; nothing was persisted.
    #[error("Address {index}: {source}")]
    InvalidPostalCode {
        index: usize,
        #[source]
        source: CepError,
    },

    /// An address failed after the user row was persisted. The user is
    /// retained; `user` is the state as committed so far. This is the
    /// documented partial-failure contract of nested creation.
    #[error("User was created, but address {index} was rejected: {source}")]
    AddressRejected {
        user: Box<UserView>,
        index: usize,
        #[source]
        source: CepError,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// User DTO for responses (never carries the password hash).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub addresses: Vec<AddressView>,
    pub created_at: String,
    pub updated_at: String,
}

impl UserView {
    #[must_use]
    pub fn from_parts(record: UserRecord, addresses: Vec<AddressView>) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            roles: record.roles.wire_names(),
            addresses,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Creation request; empty `roles` means the default USER role.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub roles: RoleSet,
    pub addresses: Vec<NewAddress>,
}

#[async_trait]
pub trait UserService: Send + Sync {
    /// Creates a user with its nested addresses.
    ///
    /// Every postal code is validated before anything is written; a
    /// pre-flight failure is [`UserError::InvalidPostalCode`] with
    /// nothing persisted. Once the user row exists, a failing address
    /// surfaces as [`UserError::AddressRejected`] and the user is NOT
    /// rolled back.
    async fn create_user(&self, request: NewUser) -> Result<UserView, UserError>;

    async fn get_user(&self, id: i64) -> Result<UserView, UserError>;

    async fn list_users(&self, request: &PageRequest) -> Result<Page<UserView>, UserError>;

    /// Updates name and email. The new email may collide only with the
    /// user being updated.
    async fn update_profile(&self, id: i64, name: &str, email: &str)
    -> Result<UserView, UserError>;

    /// Re-hashes and persists the password. No current-password
    /// confirmation; the same endpoint serves as the admin reset.
    async fn update_password(&self, id: i64, new_password: &str) -> Result<UserView, UserError>;

    /// Deletes the user and cascades its addresses.
    async fn delete_user(&self, id: i64) -> Result<(), UserError>;
}
