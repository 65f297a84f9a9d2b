use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Select, Set,
};

use crate::db::paging::{Page, PageRequest};
use crate::entities::{prelude::*, addresses};

/// Address data as stored; all location fields are normalizer output.
#[derive(Debug, Clone)]
pub struct AddressRecord {
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

impl From<addresses::Model> for AddressRecord {
    fn from(model: addresses::Model) -> Self {
        Self {
            id: model.id,
            street: model.street,
            number: model.number,
            complement: model.complement,
            neighborhood: model.neighborhood,
            city: model.city,
            state: model.state,
            postal_code: model.postal_code,
            user_id: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Fully-resolved column values for an insert or update. The service
/// layer fills the location fields from the normalizer.
#[derive(Debug, Clone)]
pub struct AddressRow {
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

pub struct AddressRepository {
    conn: DatabaseConnection,
}

impl AddressRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, user_id: i64, row: AddressRow) -> Result<AddressRecord> {
        let now = chrono::Utc::now().to_rfc3339();

        let model = addresses::ActiveModel {
            street: Set(row.street),
            number: Set(row.number),
            complement: Set(row.complement),
            neighborhood: Set(row.neighborhood),
            city: Set(row.city),
            state: Set(row.state),
            postal_code: Set(row.postal_code),
            user_id: Set(user_id),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert address")?;

        Ok(model.into())
    }

    /// Looks an address up scoped to its owner; an id that exists under
    /// a different user is treated as absent.
    pub async fn find_for_user(
        &self,
        address_id: i64,
        user_id: i64,
    ) -> Result<Option<AddressRecord>> {
        let model = Addresses::find_by_id(address_id)
            .filter(addresses::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query address")?;

        Ok(model.map(Into::into))
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<AddressRecord>> {
        let models = Addresses::find()
            .filter(addresses::Column::UserId.eq(user_id))
            .order_by_asc(addresses::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list addresses for user")?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    pub async fn page_for_user(
        &self,
        user_id: i64,
        request: &PageRequest,
    ) -> Result<Page<AddressRecord>> {
        let query = Addresses::find().filter(addresses::Column::UserId.eq(user_id));
        self.fetch_page(query, request).await
    }

    pub async fn page_all(&self, request: &PageRequest) -> Result<Page<AddressRecord>> {
        self.fetch_page(Addresses::find(), request).await
    }

    async fn fetch_page(
        &self,
        query: Select<Addresses>,
        request: &PageRequest,
    ) -> Result<Page<AddressRecord>> {
        let mut query = query.order_by(
            sort_column(request.sort_by.as_deref()),
            request.direction.order(),
        );

        if let Some(term) = request.search_term() {
            query = query.filter(search_condition(term));
        }

        let paginator = query.paginate(&self.conn, request.size);
        let totals = paginator.num_items_and_pages().await?;
        let models = paginator.fetch_page(request.page).await?;

        Ok(Page {
            content: models.into_iter().map(Into::into).collect(),
            page_number: request.page,
            page_size: request.size,
            total_elements: totals.number_of_items,
            total_pages: totals.number_of_pages,
        })
    }

    pub async fn update(
        &self,
        address_id: i64,
        user_id: i64,
        row: AddressRow,
    ) -> Result<Option<AddressRecord>> {
        let Some(model) = Addresses::find_by_id(address_id)
            .filter(addresses::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        let mut active: addresses::ActiveModel = model.into();
        active.street = Set(row.street);
        active.number = Set(row.number);
        active.complement = Set(row.complement);
        active.neighborhood = Set(row.neighborhood);
        active.city = Set(row.city);
        active.state = Set(row.state);
        active.postal_code = Set(row.postal_code);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update address")?;

        Ok(Some(updated.into()))
    }

    pub async fn delete(&self, address_id: i64, user_id: i64) -> Result<bool> {
        let result = Addresses::delete_many()
            .filter(addresses::Column::Id.eq(address_id))
            .filter(addresses::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete address")?;

        Ok(result.rows_affected > 0)
    }
}

fn sort_column(key: Option<&str>) -> addresses::Column {
    match key {
        Some("street") => addresses::Column::Street,
        Some("number") => addresses::Column::Number,
        Some("neighborhood") => addresses::Column::Neighborhood,
        Some("city") => addresses::Column::City,
        Some("state") => addresses::Column::State,
        Some("postalCode" | "postal_code") => addresses::Column::PostalCode,
        Some("createdAt" | "created_at") => addresses::Column::CreatedAt,
        Some("updatedAt" | "updated_at") => addresses::Column::UpdatedAt,
        _ => addresses::Column::Id,
    }
}

/// Case-insensitive substring match over the searchable address fields.
fn search_condition(term: &str) -> Condition {
    Condition::any()
        .add(addresses::Column::Street.contains(term))
        .add(addresses::Column::Neighborhood.contains(term))
        .add(addresses::Column::City.contains(term))
        .add(addresses::Column::State.contains(term))
        .add(addresses::Column::PostalCode.contains(term))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sort_key_falls_back_to_id() {
        assert!(matches!(sort_column(Some("bogus")), addresses::Column::Id));
        assert!(matches!(sort_column(Some("userId")), addresses::Column::Id));
        assert!(matches!(sort_column(None), addresses::Column::Id));
    }

    #[test]
    fn allowed_sort_keys_resolve() {
        assert!(matches!(
            sort_column(Some("postalCode")),
            addresses::Column::PostalCode
        ));
        assert!(matches!(sort_column(Some("city")), addresses::Column::City));
        assert!(matches!(
            sort_column(Some("street")),
            addresses::Column::Street
        ));
    }
}
