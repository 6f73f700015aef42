use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::{prelude::Session, session};

#[derive(Clone)]
pub struct SessionDao {
    db: DatabaseConnection,
}

impl DaoBase for SessionDao {
    type Entity = Session;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl SessionDao {
    pub async fn create_session(
        &self,
        user_id: Option<Uuid>,
        data: String,
        expires_at: DateTime<FixedOffset>,
    ) -> DaoResult<session::Model> {
        self.create(session::ActiveModel {
            user_id: Set(user_id),
            data: Set(data),
            expires_at: Set(expires_at),
            ..Default::default()
        })
        .await
    }

    pub async fn save_session(
        &self,
        id: Uuid,
        user_id: Option<Uuid>,
        data: String,
        expires_at: DateTime<FixedOffset>,
    ) -> DaoResult<session::Model> {
        self.update(id, move |active| {
            active.user_id = Set(user_id);
            active.data = Set(data);
            active.expires_at = Set(expires_at);
        })
        .await
    }

    pub async fn find_session(&self, id: Uuid) -> DaoResult<Option<session::Model>> {
        match self.find_by_id(id).await {
            Ok(model) => Ok(Some(model)),
            Err(DaoLayerError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Idempotent: removing an unknown session is not an error.
    pub async fn delete_session(&self, id: Uuid) -> DaoResult<()> {
        Session::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    pub async fn delete_for_user(&self, user_id: Uuid) -> DaoResult<u64> {
        let result = Session::delete_many()
            .filter(session::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn delete_expired(&self) -> DaoResult<u64> {
        let result = Session::delete_many()
            .filter(session::Column::ExpiresAt.lt(Utc::now().fixed_offset()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
