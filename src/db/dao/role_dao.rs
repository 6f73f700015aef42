use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use super::{DaoBase, DaoResult};
use crate::db::entities::{prelude::Role, role};

#[derive(Clone)]
pub struct RoleDao {
    db: DatabaseConnection,
}

impl DaoBase for RoleDao {
    type Entity = Role;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl RoleDao {
    pub async fn find_by_name(&self, name: &str) -> DaoResult<Option<role::Model>> {
        let name = name.to_string();
        self.find_first(move |query| query.filter(role::Column::Name.eq(name)))
            .await
    }

    /// Returns the named role, creating it first if needed.
    pub async fn ensure(&self, name: &str) -> DaoResult<role::Model> {
        if let Some(existing) = self.find_by_name(name).await? {
            return Ok(existing);
        }
        self.create(role::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        })
        .await
    }

    pub async fn names_for_ids(&self, ids: Vec<Uuid>) -> DaoResult<Vec<String>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let roles = Role::find()
            .filter(role::Column::Id.is_in(ids))
            .order_by_asc(role::Column::Name)
            .all(&self.db)
            .await?;
        Ok(roles.into_iter().map(|role| role.name).collect())
    }
}
