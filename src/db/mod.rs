use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::auth::{Role, RoleSet};
use crate::config::{AuthConfig, SecurityConfig};

pub mod migrator;
pub mod paging;
pub mod repositories;

pub use paging::{Page, PageRequest, SortDirection};
pub use repositories::{AddressRecord, AddressRow, UserRecord};

/// Facade over the repositories; the only transactional boundary in the
/// process.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
    security: SecurityConfig,
}

impl Store {
    pub async fn new(db_url: &str, security: SecurityConfig) -> Result<Self> {
        Self::with_pool_options(db_url, security, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        security: SecurityConfig,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn, security })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::UserRepository {
        repositories::UserRepository::new(self.conn.clone())
    }

    fn address_repo(&self) -> repositories::AddressRepository {
        repositories::AddressRepository::new(self.conn.clone())
    }

    fn role_repo(&self) -> repositories::RoleRepository {
        repositories::RoleRepository::new(self.conn.clone())
    }

    /// Seeds the role rows and the bootstrap admin account when absent.
    /// Runs once at process start.
    pub async fn ensure_seed_data(&self, auth: &AuthConfig) -> Result<()> {
        self.role_repo().ensure_seeded().await?;

        if self
            .user_repo()
            .find_by_email(&auth.bootstrap_admin_email)
            .await?
            .is_none()
        {
            let roles: RoleSet = [Role::Admin].into_iter().collect();
            self.user_repo()
                .create(
                    &auth.bootstrap_admin_name,
                    &auth.bootstrap_admin_email,
                    &auth.bootstrap_admin_password,
                    &roles,
                    &self.security,
                )
                .await?;
            info!("Seeded bootstrap admin {}", auth.bootstrap_admin_email);
        }

        Ok(())
    }

    // Users

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        roles: &RoleSet,
    ) -> Result<UserRecord> {
        self.user_repo()
            .create(name, email, password, roles, &self.security)
            .await
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<UserRecord>> {
        self.user_repo().get(id).await
    }

    pub async fn user_exists(&self, id: i64) -> Result<bool> {
        self.user_repo().exists(id).await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        self.user_repo().find_by_email(email).await
    }

    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserRecord>> {
        self.user_repo().verify_credentials(email, password).await
    }

    pub async fn update_user_profile(
        &self,
        id: i64,
        name: &str,
        email: &str,
    ) -> Result<Option<UserRecord>> {
        self.user_repo().update_profile(id, name, email).await
    }

    pub async fn update_user_password(
        &self,
        id: i64,
        new_password: &str,
    ) -> Result<Option<UserRecord>> {
        self.user_repo()
            .update_password(id, new_password, &self.security)
            .await
    }

    pub async fn delete_user(&self, id: i64) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    pub async fn list_users(&self, request: &PageRequest) -> Result<Page<UserRecord>> {
        self.user_repo().list(request).await
    }

    // Addresses

    pub async fn insert_address(&self, user_id: i64, row: AddressRow) -> Result<AddressRecord> {
        self.address_repo().insert(user_id, row).await
    }

    pub async fn get_address(
        &self,
        address_id: i64,
        user_id: i64,
    ) -> Result<Option<AddressRecord>> {
        self.address_repo().find_for_user(address_id, user_id).await
    }

    pub async fn list_addresses_for_user(&self, user_id: i64) -> Result<Vec<AddressRecord>> {
        self.address_repo().list_for_user(user_id).await
    }

    pub async fn page_addresses_for_user(
        &self,
        user_id: i64,
        request: &PageRequest,
    ) -> Result<Page<AddressRecord>> {
        self.address_repo().page_for_user(user_id, request).await
    }

    pub async fn page_all_addresses(&self, request: &PageRequest) -> Result<Page<AddressRecord>> {
        self.address_repo().page_all(request).await
    }

    pub async fn update_address(
        &self,
        address_id: i64,
        user_id: i64,
        row: AddressRow,
    ) -> Result<Option<AddressRecord>> {
        self.address_repo().update(address_id, user_id, row).await
    }

    pub async fn delete_address(&self, address_id: i64, user_id: i64) -> Result<bool> {
        self.address_repo().delete(address_id, user_id).await
    }
}
