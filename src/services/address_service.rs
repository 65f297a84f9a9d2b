//! Domain service for address management.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::db::paging::{Page, PageRequest};
use crate::db::repositories::AddressRecord;
use crate::services::cep_service::CepError;

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("User {0} not found")]
    UserNotFound(i64),

    #[error("Address {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Cep(#[from] CepError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AddressError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Client-supplied part of an address; everything else comes from the
/// normalizer.
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub postal_code: String,
    pub number: String,
    pub complement: Option<String>,
}

/// Address DTO for responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressView {
    pub id: i64,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub user_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<AddressRecord> for AddressView {
    fn from(record: AddressRecord) -> Self {
        Self {
            id: record.id,
            street: record.street,
            number: record.number,
            complement: record.complement,
            neighborhood: record.neighborhood,
            city: record.city,
            state: record.state,
            postal_code: record.postal_code,
            user_id: record.user_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Domain service trait for addresses. Owner-scoped operations verify
/// the owning user exists before touching address rows.
#[async_trait]
pub trait AddressService: Send + Sync {
    /// Normalizes the postal code and persists the address.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::UserNotFound`] for an absent owner and
    /// [`AddressError::Cep`] when normalization fails.
    async fn create_address(
        &self,
        user_id: i64,
        request: NewAddress,
    ) -> Result<AddressView, AddressError>;

    async fn get_address(&self, user_id: i64, address_id: i64)
    -> Result<AddressView, AddressError>;

    /// Owner-scoped paginated listing.
    async fn list_addresses(
        &self,
        user_id: i64,
        request: &PageRequest,
    ) -> Result<Page<AddressView>, AddressError>;

    /// Global paginated listing over every user's addresses.
    async fn list_all_addresses(
        &self,
        request: &PageRequest,
    ) -> Result<Page<AddressView>, AddressError>;

    /// Updates an address. Normalization is skipped when the postal
    /// code is unchanged, keeping the previously-valid resolution.
    async fn update_address(
        &self,
        user_id: i64,
        address_id: i64,
        request: NewAddress,
    ) -> Result<AddressView, AddressError>;

    async fn delete_address(&self, user_id: i64, address_id: i64) -> Result<(), AddressError>;
}
