//! `SeaORM` implementation of the `AddressService` trait.

use async_trait::async_trait;
use std::sync::Arc;

use crate::db::Store;
use crate::db::paging::{Page, PageRequest};
use crate::db::repositories::AddressRow;
use crate::services::address_service::{AddressError, AddressService, AddressView, NewAddress};
use crate::services::cep_service::{CepService, canonicalize};

pub struct SeaOrmAddressService {
    store: Store,
    cep: Arc<dyn CepService>,
}

impl SeaOrmAddressService {
    #[must_use]
    pub fn new(store: Store, cep: Arc<dyn CepService>) -> Self {
        Self { store, cep }
    }

    async fn require_user(&self, user_id: i64) -> Result<(), AddressError> {
        if !self.store.user_exists(user_id).await? {
            return Err(AddressError::UserNotFound(user_id));
        }
        Ok(())
    }
}

#[async_trait]
impl AddressService for SeaOrmAddressService {
    async fn create_address(
        &self,
        user_id: i64,
        request: NewAddress,
    ) -> Result<AddressView, AddressError> {
        self.require_user(user_id).await?;

        let info = self.cep.resolve(&request.postal_code).await?;

        let record = self
            .store
            .insert_address(
                user_id,
                AddressRow {
                    street: info.street,
                    number: request.number,
                    complement: request.complement,
                    neighborhood: info.neighborhood,
                    city: info.city,
                    state: info.state,
                    postal_code: info.postal_code,
                },
            )
            .await?;

        Ok(record.into())
    }

    async fn get_address(
        &self,
        user_id: i64,
        address_id: i64,
    ) -> Result<AddressView, AddressError> {
        self.require_user(user_id).await?;

        let record = self
            .store
            .get_address(address_id, user_id)
            .await?
            .ok_or(AddressError::NotFound(address_id))?;

        Ok(record.into())
    }

    async fn list_addresses(
        &self,
        user_id: i64,
        request: &PageRequest,
    ) -> Result<Page<AddressView>, AddressError> {
        self.require_user(user_id).await?;

        let page = self.store.page_addresses_for_user(user_id, request).await?;
        Ok(page.map(Into::into))
    }

    async fn list_all_addresses(
        &self,
        request: &PageRequest,
    ) -> Result<Page<AddressView>, AddressError> {
        let page = self.store.page_all_addresses(request).await?;
        Ok(page.map(Into::into))
    }

    async fn update_address(
        &self,
        user_id: i64,
        address_id: i64,
        request: NewAddress,
    ) -> Result<AddressView, AddressError> {
        self.require_user(user_id).await?;

        let existing = self
            .store
            .get_address(address_id, user_id)
            .await?
            .ok_or(AddressError::NotFound(address_id))?;

        // Unchanged postal code keeps the stored resolution; only a new
        // code goes back to the normalizer.
        let unchanged = canonicalize(&request.postal_code)
            .map(|digits| digits == existing.postal_code)
            .unwrap_or(false);

        let row = if unchanged {
            AddressRow {
                street: existing.street,
                number: request.number,
                complement: request.complement,
                neighborhood: existing.neighborhood,
                city: existing.city,
                state: existing.state,
                postal_code: existing.postal_code,
            }
        } else {
            let info = self.cep.resolve(&request.postal_code).await?;
            AddressRow {
                street: info.street,
                number: request.number,
                complement: request.complement,
                neighborhood: info.neighborhood,
                city: info.city,
                state: info.state,
                postal_code: info.postal_code,
            }
        };

        let record = self
            .store
            .update_address(address_id, user_id, row)
            .await?
            .ok_or(AddressError::NotFound(address_id))?;

        Ok(record.into())
    }

    async fn delete_address(&self, user_id: i64, address_id: i64) -> Result<(), AddressError> {
        self.require_user(user_id).await?;

        if !self.store.delete_address(address_id, user_id).await? {
            return Err(AddressError::NotFound(address_id));
        }

        Ok(())
    }
}
