use sea_orm::{ColumnTrait, Condition, DatabaseConnection, Order, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoResult, PaginatedResponse};
use crate::auth::{NewUser, ProfileUpdate, UserQuery, full_name};
use crate::db::entities::{prelude::User, user};

#[derive(Clone)]
pub struct UserDao {
    db: DatabaseConnection,
}

impl DaoBase for UserDao {
    type Entity = User;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl UserDao {
    pub async fn find_by_email(&self, email: &str) -> DaoResult<Option<user::Model>> {
        let email = email.to_string();
        self.find_first(move |query| query.filter(user::Column::Email.eq(email)))
            .await
    }

    pub async fn create_user(&self, new_user: &NewUser) -> DaoResult<user::Model> {
        let model = user::ActiveModel {
            email: Set(new_user.email.clone()),
            password_hash: Set(new_user.password_hash.clone()),
            first_name: Set(new_user.first_name.clone()),
            last_name: Set(new_user.last_name.clone()),
            full_name: Set(full_name(&new_user.first_name, &new_user.last_name)),
            avatar: Set(None),
            email_verified: Set(false),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> DaoResult<user::Model> {
        let password_hash = password_hash.to_string();
        self.update(id, move |active| {
            active.password_hash = Set(password_hash);
        })
        .await
    }

    pub async fn mark_email_verified(&self, id: Uuid) -> DaoResult<user::Model> {
        self.update(id, |active| {
            active.email_verified = Set(true);
        })
        .await
    }

    pub async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> DaoResult<user::Model> {
        let update = update.clone();
        self.update(id, move |active| {
            active.full_name = Set(full_name(&update.first_name, &update.last_name));
            active.first_name = Set(update.first_name);
            active.last_name = Set(update.last_name);
            active.avatar = Set(update.avatar);
        })
        .await
    }

    /// Case-sensitive substring match on full name or email, oldest first.
    pub async fn search(&self, query: &UserQuery) -> DaoResult<PaginatedResponse<user::Model>> {
        let condition = search_condition(query.search.as_deref());
        let mut page = self
            .find(
                query.page,
                query.per_page,
                Some((user::Column::CreatedAt, Order::Asc)),
                {
                    let condition = condition.clone();
                    move |select| select.filter(condition)
                },
            )
            .await?;
        page.total = Some(self.count(move |select| select.filter(condition)).await?);
        Ok(page)
    }
}

fn search_condition(search: Option<&str>) -> Condition {
    match search.map(str::trim).filter(|term| !term.is_empty()) {
        Some(term) => Condition::any()
            .add(user::Column::FullName.contains(term))
            .add(user::Column::Email.contains(term)),
        None => Condition::all(),
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use crate::{
        auth::{NewUser, ProfileUpdate},
        db::{
            dao::{DaoBase, DaoLayerError},
            entities::user,
        },
        test_helpers::user_model,
    };

    use super::UserDao;

    #[tokio::test]
    async fn find_by_email_returns_first_match() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model(id, "alice@example.com", "hash")]])
            .into_connection();
        let dao = UserDao::new(&db);

        let result = dao
            .find_by_email("alice@example.com")
            .await
            .expect("query should succeed");
        assert_eq!(result.map(|u| u.id), Some(id));
    }

    #[tokio::test]
    async fn find_by_email_returns_none_when_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let dao = UserDao::new(&db);

        let result = dao
            .find_by_email("missing@example.com")
            .await
            .expect("query should succeed");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn create_user_returns_inserted_row() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model(id, "ada@example.com", "hash")]])
            .into_connection();
        let dao = UserDao::new(&db);

        let created = dao
            .create_user(&NewUser {
                email: "ada@example.com".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .expect("insert should succeed");

        assert_eq!(created.id, id);
        assert!(!created.email_verified);
    }

    #[tokio::test]
    async fn update_profile_propagates_not_found() {
        let missing_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let dao = UserDao::new(&db);

        let err = dao
            .update_profile(
                missing_id,
                &ProfileUpdate {
                    first_name: "Ada".to_string(),
                    last_name: "Byron".to_string(),
                    avatar: None,
                },
            )
            .await
            .expect_err("update should fail");
        assert!(matches!(
            err,
            DaoLayerError::NotFound { id, .. } if id == missing_id
        ));
    }

    #[tokio::test]
    async fn mark_email_verified_returns_updated_row() {
        let id = Uuid::new_v4();
        let mut verified = user_model(id, "ada@example.com", "hash");
        verified.email_verified = true;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model(id, "ada@example.com", "hash")]])
            .append_query_results([[verified]])
            .into_connection();
        let dao = UserDao::new(&db);

        let updated = dao
            .mark_email_verified(id)
            .await
            .expect("update should succeed");
        assert!(updated.email_verified);
    }
}
