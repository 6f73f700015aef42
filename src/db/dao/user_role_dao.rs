use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoResult};
use crate::db::entities::{prelude::UserRole, user_role};

#[derive(Clone)]
pub struct UserRoleDao {
    db: DatabaseConnection,
}

impl DaoBase for UserRoleDao {
    type Entity = UserRole;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl UserRoleDao {
    pub async fn assign(&self, user_id: Uuid, role_id: Uuid) -> DaoResult<user_role::Model> {
        let link = user_role::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(role_id),
            ..Default::default()
        };
        self.create(link).await
    }

    pub async fn role_ids_for_user(&self, user_id: Uuid) -> DaoResult<Vec<Uuid>> {
        let links = UserRole::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?;
        Ok(links.into_iter().map(|link| link.role_id).collect())
    }
}
