use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tokio::task;

use crate::auth::RoleSet;
use crate::config::SecurityConfig;
use crate::db::paging::{Page, PageRequest};
use crate::entities::{prelude::*, addresses, roles, user_roles, users};

/// User data returned from the repository (without the password hash).
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub roles: RoleSet,
    pub created_at: String,
    pub updated_at: String,
}

impl UserRecord {
    fn from_model(model: users::Model, roles: RoleSet) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            roles,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    async fn roles_of(&self, user: &users::Model) -> Result<RoleSet> {
        let rows = user
            .find_related(Roles)
            .all(&self.conn)
            .await
            .context("Failed to load roles for user")?;
        Ok(RoleSet::from_wire_names(rows.iter().map(|r| r.name.as_str())))
    }

    async fn to_record(&self, model: users::Model) -> Result<UserRecord> {
        let roles = self.roles_of(&model).await?;
        Ok(UserRecord::from_model(model, roles))
    }

    /// Inserts a user with its role assignments in one transaction.
    /// The password is hashed here; callers never see the hash.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role_set: &RoleSet,
        security: &SecurityConfig,
    ) -> Result<UserRecord> {
        let password = password.to_string();
        let security = security.clone();
        let hash = task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.conn.begin().await?;

        let user = users::ActiveModel {
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(hash),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert user")?;

        for role in role_set.iter() {
            let role_row = Roles::find()
                .filter(roles::Column::Name.eq(role.wire_name()))
                .one(&txn)
                .await?
                .with_context(|| format!("Role not seeded: {}", role.wire_name()))?;

            user_roles::ActiveModel {
                user_id: Set(user.id),
                role_id: Set(role_row.id),
            }
            .insert(&txn)
            .await
            .context("Failed to assign role")?;
        }

        txn.commit().await?;

        Ok(UserRecord::from_model(user, role_set.clone()))
    }

    pub async fn get(&self, id: i64) -> Result<Option<UserRecord>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by id")?;

        match user {
            Some(model) => Ok(Some(self.to_record(model).await?)),
            None => Ok(None),
        }
    }

    pub async fn exists(&self, id: i64) -> Result<bool> {
        let count = Users::find_by_id(id)
            .count(&self.conn)
            .await
            .context("Failed to check user existence")?;
        Ok(count > 0)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        match user {
            Some(model) => Ok(Some(self.to_record(model).await?)),
            None => Ok(None),
        }
    }

    /// Verifies credentials and returns the user on success.
    /// Argon2 verification runs under `spawn_blocking`.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserRecord>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user for credential check")?;

        let Some(user) = user else {
            return Ok(None);
        };

        let password_hash = user.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        if !is_valid {
            return Ok(None);
        }

        Ok(Some(self.to_record(user).await?))
    }

    pub async fn update_profile(
        &self,
        id: i64,
        name: &str,
        email: &str,
    ) -> Result<Option<UserRecord>> {
        let Some(user) = Users::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        active.name = Set(name.to_string());
        active.email = Set(email.to_string());
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        let updated = active.update(&self.conn).await.context("Failed to update user")?;

        Ok(Some(self.to_record(updated).await?))
    }

    pub async fn update_password(
        &self,
        id: i64,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<Option<UserRecord>> {
        let Some(user) = Users::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let password = new_password.to_string();
        let security = security.clone();
        let new_hash = task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .context("Password hashing task panicked")??;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update password")?;

        Ok(Some(self.to_record(updated).await?))
    }

    /// Deletes a user with its addresses and role assignments in one
    /// transaction. Returns false when the user does not exist.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let txn = self.conn.begin().await?;

        Addresses::delete_many()
            .filter(addresses::Column::UserId.eq(id))
            .exec(&txn)
            .await
            .context("Failed to delete addresses for user")?;

        UserRoles::delete_many()
            .filter(user_roles::Column::UserId.eq(id))
            .exec(&txn)
            .await
            .context("Failed to delete role assignments for user")?;

        let result = Users::delete_by_id(id)
            .exec(&txn)
            .await
            .context("Failed to delete user")?;

        txn.commit().await?;

        Ok(result.rows_affected > 0)
    }

    /// Paginated listing with the optional case-insensitive search over
    /// name and email.
    pub async fn list(&self, request: &PageRequest) -> Result<Page<UserRecord>> {
        let mut query = Users::find()
            .order_by(sort_column(request.sort_by.as_deref()), request.direction.order());

        if let Some(term) = request.search_term() {
            query = query.filter(
                Condition::any()
                    .add(users::Column::Name.contains(term))
                    .add(users::Column::Email.contains(term)),
            );
        }

        let paginator = query.paginate(&self.conn, request.size);
        let totals = paginator.num_items_and_pages().await?;
        let models = paginator.fetch_page(request.page).await?;

        let mut content = Vec::with_capacity(models.len());
        for model in models {
            content.push(self.to_record(model).await?);
        }

        Ok(Page {
            content,
            page_number: request.page,
            page_size: request.size,
            total_elements: totals.number_of_items,
            total_pages: totals.number_of_pages,
        })
    }
}

/// Resolves the requested sort key, silently falling back to `id` for
/// anything outside the allowed set.
fn sort_column(key: Option<&str>) -> users::Column {
    match key {
        Some("name") => users::Column::Name,
        Some("email") => users::Column::Email,
        Some("createdAt" | "created_at") => users::Column::CreatedAt,
        Some("updatedAt" | "updated_at") => users::Column::UpdatedAt,
        _ => users::Column::Id,
    }
}

/// Hashes a password with Argon2id using the configured parameters.
pub fn hash_password(password: &str, security: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        security.argon2_memory_cost_kib,
        security.argon2_time_cost,
        security.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sort_key_falls_back_to_id() {
        assert!(matches!(sort_column(Some("bogus")), users::Column::Id));
        assert!(matches!(sort_column(None), users::Column::Id));
        assert!(matches!(sort_column(Some("passwordHash")), users::Column::Id));
    }

    #[test]
    fn allowed_sort_keys_resolve() {
        assert!(matches!(sort_column(Some("name")), users::Column::Name));
        assert!(matches!(sort_column(Some("email")), users::Column::Email));
        assert!(matches!(
            sort_column(Some("createdAt")),
            users::Column::CreatedAt
        ));
        assert!(matches!(
            sort_column(Some("updated_at")),
            users::Column::UpdatedAt
        ));
    }
}
