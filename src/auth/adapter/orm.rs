use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::DatabaseAdapter;
use crate::{
    auth::{
        AuthError, ChangePassword, NewUser, ProfileUpdate, RegisterForm, Role, SessionUser,
        TokenData, UserQuery, VerificationKind,
        password::{hash_password, normalize_email, verify_password},
        tokens::{expires_after, generate_token},
    },
    db::{
        dao::{DaoBase, DaoContext, DaoLayerError, PaginatedResponse},
        entities::{user, verification_token},
    },
    error::AppError,
};

/// Adapter over the sea-orm DAO layer.
#[derive(Clone)]
pub struct SeaOrmAdapter {
    daos: DaoContext,
}

impl SeaOrmAdapter {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self {
            daos: DaoContext::new(db),
        }
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<user::Model>, AppError> {
        match self.daos.user().find_by_id(id).await {
            Ok(model) => Ok(Some(model)),
            Err(DaoLayerError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn with_roles(&self, model: user::Model) -> Result<SessionUser, AppError> {
        let role_ids = self.daos.user_role().role_ids_for_user(model.id).await?;
        let roles = self.daos.role().names_for_ids(role_ids).await?;
        Ok(session_user(model, roles))
    }

    async fn assign_roles(&self, user_id: Uuid, roles: &[&str]) -> Result<Vec<String>, AppError> {
        let mut assigned = Vec::with_capacity(roles.len());
        for name in roles {
            let role = self.daos.role().ensure(name).await?;
            self.daos.user_role().assign(user_id, role.id).await?;
            assigned.push(role.name);
        }
        Ok(assigned)
    }

    async fn issue_token(
        &self,
        email: &str,
        kind: VerificationKind,
        expires_in_minutes: i64,
    ) -> Result<TokenData, AppError> {
        let row = self
            .daos
            .verification_token()
            .issue(
                &normalize_email(email),
                kind,
                &generate_token(),
                expires_after(expires_in_minutes)?,
            )
            .await?;
        token_data(row)
    }

    async fn validate_token(
        &self,
        token: &str,
        kind: VerificationKind,
    ) -> Result<TokenData, AppError> {
        let tokens = self.daos.verification_token();
        let Some(row) = tokens.find_by_token(token, kind).await? else {
            return Err(AuthError::invalid_token().into());
        };

        let data = token_data(row)?;
        if data.is_expired() {
            tokens.delete_token(token).await?;
            return Err(AuthError::token_expired().into());
        }
        Ok(data)
    }
}

fn session_user(model: user::Model, roles: Vec<String>) -> SessionUser {
    SessionUser {
        id: model.id,
        email: model.email,
        full_name: model.full_name,
        first_name: model.first_name,
        last_name: model.last_name,
        avatar: model.avatar,
        email_verified: model.email_verified,
        roles,
    }
}

fn token_data(row: verification_token::Model) -> Result<TokenData, AppError> {
    let kind = VerificationKind::try_from(row.kind.as_str())
        .map_err(|_| AppError::internal(format!("Unknown verification token kind: {}", row.kind)))?;
    Ok(TokenData {
        token: row.token,
        identifier: row.identifier,
        kind,
        expires_at: row.expires_at,
    })
}

#[async_trait]
impl DatabaseAdapter for SeaOrmAdapter {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<SessionUser>, AppError> {
        match self.daos.user().find_by_email(&normalize_email(email)).await? {
            Some(model) => Ok(Some(self.with_roles(model).await?)),
            None => Ok(None),
        }
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<SessionUser>, AppError> {
        match self.find_user(id).await? {
            Some(model) => Ok(Some(self.with_roles(model).await?)),
            None => Ok(None),
        }
    }

    async fn login_user(&self, email: &str, password: &str) -> Result<SessionUser, AppError> {
        let model = self
            .daos
            .user()
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(AuthError::invalid_credentials)?;

        if !verify_password(password, &model.password_hash)? {
            return Err(AuthError::invalid_credentials().into());
        }
        self.with_roles(model).await
    }

    async fn register_user(&self, form: &RegisterForm) -> Result<SessionUser, AppError> {
        let new_user = self.prepare_registration(form)?;
        if self.daos.user().find_by_email(&new_user.email).await?.is_some() {
            return Err(AuthError::user_already_exists().into());
        }

        let model = self.daos.user().create_user(&new_user).await?;
        let roles = self.assign_roles(model.id, &[Role::User.as_str()]).await?;
        Ok(session_user(model, roles))
    }

    async fn verify_email(&self, token: &str) -> Result<SessionUser, AppError> {
        let data = self
            .validate_token(token, VerificationKind::EmailVerification)
            .await?;
        let users = self.daos.user();
        let model = users
            .find_by_email(&data.identifier)
            .await?
            .ok_or_else(AuthError::user_not_found)?;

        let verified = users.mark_email_verified(model.id).await?;
        self.daos.verification_token().delete_token(token).await?;
        self.with_roles(verified).await
    }

    async fn generate_password_reset_token(
        &self,
        email: &str,
        expires_in_minutes: i64,
    ) -> Result<TokenData, AppError> {
        self.issue_token(email, VerificationKind::PasswordReset, expires_in_minutes)
            .await
    }

    async fn generate_email_verification_token(
        &self,
        email: &str,
        expires_in_minutes: i64,
    ) -> Result<TokenData, AppError> {
        self.issue_token(email, VerificationKind::EmailVerification, expires_in_minutes)
            .await
    }

    async fn delete_password_reset_token(&self, token: &str) -> Result<(), AppError> {
        if self.daos.verification_token().delete_token(token).await? == 0 {
            return Err(AuthError::token_not_found().into());
        }
        Ok(())
    }

    async fn validate_password_reset_token(&self, token: &str) -> Result<TokenData, AppError> {
        self.validate_token(token, VerificationKind::PasswordReset)
            .await
    }

    async fn reset_user_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<SessionUser, AppError> {
        let data = self
            .validate_token(token, VerificationKind::PasswordReset)
            .await?;
        if !self.validate_password(new_password) {
            return Err(AuthError::invalid_password().into());
        }

        let users = self.daos.user();
        let model = users
            .find_by_email(&data.identifier)
            .await?
            .ok_or_else(AuthError::user_not_found)?;
        let updated = users
            .set_password_hash(model.id, &hash_password(new_password)?)
            .await?;
        self.with_roles(updated).await
    }

    async fn change_user_password(&self, change: &ChangePassword) -> Result<(), AppError> {
        let model = self
            .find_user(change.user_id)
            .await?
            .ok_or_else(AuthError::user_not_found)?;

        if !verify_password(&change.current_password, &model.password_hash)? {
            return Err(AuthError::invalid_current_password().into());
        }
        if !self.validate_password(&change.new_password) {
            return Err(AuthError::invalid_password().into());
        }

        self.daos
            .user()
            .set_password_hash(model.id, &hash_password(&change.new_password)?)
            .await?;
        Ok(())
    }

    async fn update_user_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<SessionUser, AppError> {
        match self.daos.user().update_profile(id, update).await {
            Ok(model) => self.with_roles(model).await,
            Err(DaoLayerError::NotFound { .. }) => Err(AuthError::user_not_found().into()),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        let model = self
            .find_user(id)
            .await?
            .ok_or_else(AuthError::user_not_found)?;

        self.daos.session().delete_for_user(id).await?;
        self.daos
            .verification_token()
            .delete_for_identifier(&model.email)
            .await?;
        self.daos.user().delete(id).await?;
        Ok(())
    }

    async fn list_users(
        &self,
        query: &UserQuery,
    ) -> Result<PaginatedResponse<SessionUser>, AppError> {
        let PaginatedResponse {
            data,
            page,
            page_size,
            has_next,
            total,
        } = self.daos.user().search(query).await?;

        let mut users = Vec::with_capacity(data.len());
        for model in data {
            users.push(self.with_roles(model).await?);
        }

        Ok(PaginatedResponse {
            data: users,
            page,
            page_size,
            has_next,
            total,
        })
    }

    async fn ensure_roles(&self, names: &[&str]) -> Result<(), AppError> {
        for name in names {
            self.daos.role().ensure(name).await?;
        }
        Ok(())
    }

    async fn seed_user(
        &self,
        user: NewUser,
        roles: &[&str],
    ) -> Result<Option<SessionUser>, AppError> {
        if self.daos.user().find_by_email(&user.email).await?.is_some() {
            return Ok(None);
        }
        let model = self.daos.user().create_user(&user).await?;
        let roles = self.assign_roles(model.id, roles).await?;
        Ok(Some(session_user(model, roles)))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use crate::{
        auth::{
            AuthErrorCode, ChangePassword, RegisterForm, adapter::DatabaseAdapter,
            password::hash_password,
        },
        db::entities::{role, user, user_role, verification_token},
        error::AppError,
        test_helpers::{token_model, ts, user_model},
    };

    use super::SeaOrmAdapter;

    struct AdapterFixtureBuilder {
        mock: MockDatabase,
    }

    impl AdapterFixtureBuilder {
        fn new() -> Self {
            Self {
                mock: MockDatabase::new(DatabaseBackend::Postgres),
            }
        }

        fn with_users(mut self, rows: Vec<user::Model>) -> Self {
            self.mock = self.mock.append_query_results([rows]);
            self
        }

        fn with_tokens(mut self, rows: Vec<verification_token::Model>) -> Self {
            self.mock = self.mock.append_query_results([rows]);
            self
        }

        fn with_role_links(mut self, rows: Vec<user_role::Model>) -> Self {
            self.mock = self.mock.append_query_results([rows]);
            self
        }

        fn with_roles(mut self, rows: Vec<role::Model>) -> Self {
            self.mock = self.mock.append_query_results([rows]);
            self
        }

        fn with_rows_affected(mut self, rows_affected: u64) -> Self {
            self.mock = self.mock.append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected,
            }]);
            self
        }

        fn build(self) -> SeaOrmAdapter {
            SeaOrmAdapter::new(&self.mock.into_connection())
        }
    }

    fn code_of(err: AppError) -> AuthErrorCode {
        err.auth()
            .map(|auth| auth.code.clone())
            .expect("error should be an auth error")
    }

    fn role_row(id: Uuid, name: &str) -> role::Model {
        role::Model {
            id,
            created_at: ts(),
            updated_at: ts(),
            name: name.to_string(),
        }
    }

    fn link_row(user_id: Uuid, role_id: Uuid) -> user_role::Model {
        user_role::Model {
            id: Uuid::new_v4(),
            created_at: ts(),
            updated_at: ts(),
            user_id,
            role_id,
        }
    }

    #[tokio::test]
    async fn login_returns_user_with_roles() {
        let user_id = Uuid::new_v4();
        let role_id = Uuid::new_v4();
        let hash = hash_password("abc123").expect("hash should succeed");
        let adapter = AdapterFixtureBuilder::new()
            .with_users(vec![user_model(user_id, "ada@example.com", &hash)])
            .with_role_links(vec![link_row(user_id, role_id)])
            .with_roles(vec![role_row(role_id, "admin")])
            .build();

        let user = adapter
            .login_user(" Ada@Example.com ", "abc123")
            .await
            .expect("login should succeed");

        assert_eq!(user.id, user_id);
        assert_eq!(user.roles, vec!["admin".to_string()]);
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_invalid_credentials() {
        let hash = hash_password("abc123").expect("hash should succeed");
        let adapter = AdapterFixtureBuilder::new()
            .with_users(vec![user_model(Uuid::new_v4(), "ada@example.com", &hash)])
            .build();

        let err = adapter
            .login_user("ada@example.com", "abc124")
            .await
            .expect_err("login should fail");

        assert_eq!(code_of(err), AuthErrorCode::InvalidCredentials);
    }

    #[tokio::test]
    async fn login_with_unknown_email_is_invalid_credentials() {
        let adapter = AdapterFixtureBuilder::new().with_users(Vec::new()).build();

        let err = adapter
            .login_user("nobody@example.com", "abc123")
            .await
            .expect_err("login should fail");

        assert_eq!(code_of(err), AuthErrorCode::InvalidCredentials);
    }

    #[tokio::test]
    async fn register_rejects_existing_email() {
        let adapter = AdapterFixtureBuilder::new()
            .with_users(vec![user_model(Uuid::new_v4(), "ada@example.com", "hash")])
            .build();

        let err = adapter
            .register_user(&RegisterForm {
                first_name: Some("Ada".to_string()),
                last_name: Some("Lovelace".to_string()),
                email: Some("ADA@example.com".to_string()),
                password: Some("abc123".to_string()),
            })
            .await
            .expect_err("duplicate registration should fail");

        assert_eq!(code_of(err), AuthErrorCode::UserAlreadyExists);
    }

    #[tokio::test]
    async fn unknown_reset_token_is_invalid() {
        let adapter = AdapterFixtureBuilder::new().with_tokens(Vec::new()).build();

        let err = adapter
            .validate_password_reset_token("missing")
            .await
            .expect_err("validation should fail");

        assert_eq!(code_of(err), AuthErrorCode::InvalidToken);
    }

    #[tokio::test]
    async fn expired_reset_token_is_deleted_and_reported() {
        let expired = token_model(
            "stale",
            "ada@example.com",
            Utc::now().fixed_offset() - Duration::minutes(1),
        );
        let adapter = AdapterFixtureBuilder::new()
            .with_tokens(vec![expired])
            .with_rows_affected(1)
            .build();

        let err = adapter
            .validate_password_reset_token("stale")
            .await
            .expect_err("validation should fail");

        assert_eq!(code_of(err), AuthErrorCode::TokenExpired);
    }

    #[tokio::test]
    async fn live_reset_token_validates() {
        let live = token_model(
            "fresh",
            "ada@example.com",
            Utc::now().fixed_offset() + Duration::minutes(15),
        );
        let adapter = AdapterFixtureBuilder::new().with_tokens(vec![live]).build();

        let data = adapter
            .validate_password_reset_token("fresh")
            .await
            .expect("validation should succeed");

        assert_eq!(data.identifier, "ada@example.com");
    }

    #[tokio::test]
    async fn deleting_unknown_token_reports_not_found() {
        let adapter = AdapterFixtureBuilder::new().with_rows_affected(0).build();

        let err = adapter
            .delete_password_reset_token("missing")
            .await
            .expect_err("delete should fail");

        assert_eq!(code_of(err), AuthErrorCode::TokenNotFound);
    }

    #[tokio::test]
    async fn change_password_rejects_wrong_current_password() {
        let user_id = Uuid::new_v4();
        let hash = hash_password("abc123").expect("hash should succeed");
        let adapter = AdapterFixtureBuilder::new()
            .with_users(vec![user_model(user_id, "ada@example.com", &hash)])
            .build();

        let err = adapter
            .change_user_password(&ChangePassword {
                user_id,
                current_password: "wrong123".to_string(),
                new_password: "next456".to_string(),
            })
            .await
            .expect_err("change should fail");

        assert_eq!(code_of(err), AuthErrorCode::InvalidCurrentPassword);
    }

    #[tokio::test]
    async fn delete_unknown_user_reports_not_found() {
        let adapter = AdapterFixtureBuilder::new().with_users(Vec::new()).build();

        let err = adapter
            .delete_user(Uuid::new_v4())
            .await
            .expect_err("delete should fail");

        assert_eq!(code_of(err), AuthErrorCode::UserNotFound);
    }
}
