use std::sync::Arc;

use uuid::Uuid;

use crate::{
    auth::{ProfileUpdate, SessionUser, UserQuery, adapter::DatabaseAdapter},
    db::dao::PaginatedResponse,
    error::AppError,
};

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 255;

#[derive(Clone)]
pub struct UserService {
    adapter: Arc<dyn DatabaseAdapter>,
}

impl UserService {
    pub fn new(adapter: Arc<dyn DatabaseAdapter>) -> Self {
        Self { adapter }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<SessionUser>, AppError> {
        self.adapter.get_user_by_id(id).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<SessionUser, AppError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("user {id} not found")))
    }

    /// Trims both names and recomputes the full name.
    pub async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<SessionUser, AppError> {
        let update = ProfileUpdate {
            first_name: checked_name("firstName", &update.first_name)?,
            last_name: checked_name("lastName", &update.last_name)?,
            avatar: update
                .avatar
                .as_deref()
                .map(str::trim)
                .filter(|avatar| !avatar.is_empty())
                .map(str::to_string),
        };
        let user = self.adapter.update_user_profile(id, &update).await?;
        tracing::info!(user_id = %id, "profile updated");
        Ok(user)
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        self.adapter.delete_user(id).await?;
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }

    pub async fn list_users(
        &self,
        query: &UserQuery,
    ) -> Result<PaginatedResponse<SessionUser>, AppError> {
        self.adapter.list_users(query).await
    }
}

fn checked_name(field: &str, raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    let len = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        return Err(AppError::bad_request(format!(
            "{field} must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"
        )));
    }
    Ok(name.to_string())
}
