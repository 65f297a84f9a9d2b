//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;

use crate::auth::RoleSet;
use crate::db::Store;
use crate::db::paging::{Page, PageRequest};
use crate::db::repositories::UserRecord;
use crate::services::address_service::{AddressError, AddressService, AddressView};
use crate::services::cep_service::CepService;
use crate::services::user_service::{NewUser, UserError, UserService, UserView};

pub struct SeaOrmUserService {
    store: Store,
    cep: Arc<dyn CepService>,
    addresses: Arc<dyn AddressService>,
}

impl SeaOrmUserService {
    #[must_use]
    pub fn new(store: Store, cep: Arc<dyn CepService>, addresses: Arc<dyn AddressService>) -> Self {
        Self {
            store,
            cep,
            addresses,
        }
    }

    async fn view_of(&self, record: UserRecord) -> Result<UserView, UserError> {
        let addresses = self
            .store
            .list_addresses_for_user(record.id)
            .await?
            .into_iter()
            .map(AddressView::from)
            .collect();
        Ok(UserView::from_parts(record, addresses))
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn create_user(&self, request: NewUser) -> Result<UserView, UserError> {
        if self
            .store
            .find_user_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(UserError::EmailAlreadyExists(request.email));
        }

        // Pre-flight: every postal code must resolve before anything is
        // written. The lookups run concurrently; a failure is reported
        // for the lowest failing index.
        let checks = join_all(
            request
                .addresses
                .iter()
                .map(|address| self.cep.resolve(&address.postal_code)),
        )
        .await;

        for (index, check) in checks.into_iter().enumerate() {
            if let Err(source) = check {
                return Err(UserError::InvalidPostalCode { index, source });
            }
        }

        let roles = if request.roles.is_empty() {
            RoleSet::user_only()
        } else {
            request.roles.clone()
        };

        let record = self
            .store
            .create_user(&request.name, &request.email, &request.password, &roles)
            .await?;

        // Addresses are created in input order. From here on the user
        // row stays, whatever happens to the remaining addresses.
        let mut saved = Vec::with_capacity(request.addresses.len());
        for (index, address) in request.addresses.into_iter().enumerate() {
            match self.addresses.create_address(record.id, address).await {
                Ok(view) => saved.push(view),
                Err(AddressError::Cep(source)) => {
                    let user = UserView::from_parts(record, saved);
                    return Err(UserError::AddressRejected {
                        user: Box::new(user),
                        index,
                        source,
                    });
                }
                Err(err) => return Err(UserError::Internal(err.to_string())),
            }
        }

        Ok(UserView::from_parts(record, saved))
    }

    async fn get_user(&self, id: i64) -> Result<UserView, UserError> {
        let record = self
            .store
            .get_user(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        self.view_of(record).await
    }

    async fn list_users(&self, request: &PageRequest) -> Result<Page<UserView>, UserError> {
        let page = self.store.list_users(request).await?;

        let mut content = Vec::with_capacity(page.content.len());
        for record in page.content {
            let addresses = self
                .store
                .list_addresses_for_user(record.id)
                .await?
                .into_iter()
                .map(AddressView::from)
                .collect();
            content.push(UserView::from_parts(record, addresses));
        }

        Ok(Page {
            content,
            page_number: page.page_number,
            page_size: page.page_size,
            total_elements: page.total_elements,
            total_pages: page.total_pages,
        })
    }

    async fn update_profile(
        &self,
        id: i64,
        name: &str,
        email: &str,
    ) -> Result<UserView, UserError> {
        if !self.store.user_exists(id).await? {
            return Err(UserError::NotFound(id));
        }

        // The email may only collide with the user being updated.
        if let Some(other) = self.store.find_user_by_email(email).await?
            && other.id != id
        {
            return Err(UserError::EmailAlreadyExists(email.to_string()));
        }

        let record = self
            .store
            .update_user_profile(id, name, email)
            .await?
            .ok_or(UserError::NotFound(id))?;

        self.view_of(record).await
    }

    async fn update_password(&self, id: i64, new_password: &str) -> Result<UserView, UserError> {
        let record = self
            .store
            .update_user_password(id, new_password)
            .await?
            .ok_or(UserError::NotFound(id))?;

        self.view_of(record).await
    }

    async fn delete_user(&self, id: i64) -> Result<(), UserError> {
        if !self.store.delete_user(id).await? {
            return Err(UserError::NotFound(id));
        }

        Ok(())
    }
}
