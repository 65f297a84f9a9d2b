use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;

use crate::auth::Role;
use crate::entities::{prelude::*, roles};

pub struct RoleRepository {
    conn: DatabaseConnection,
}

impl RoleRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_name(&self, role: Role) -> Result<Option<roles::Model>> {
        let row = Roles::find()
            .filter(roles::Column::Name.eq(role.wire_name()))
            .one(&self.conn)
            .await
            .context("Failed to query role by name")?;
        Ok(row)
    }

    /// Seeds the fixed role rows when absent. Runs at process start;
    /// roles are never deleted at runtime.
    pub async fn ensure_seeded(&self) -> Result<()> {
        for role in [Role::User, Role::Admin] {
            if self.find_by_name(role).await?.is_none() {
                roles::ActiveModel {
                    name: Set(role.wire_name().to_string()),
                    ..Default::default()
                }
                .insert(&self.conn)
                .await
                .context("Failed to seed role")?;

                info!("Seeded role {}", role.wire_name());
            }
        }
        Ok(())
    }
}
