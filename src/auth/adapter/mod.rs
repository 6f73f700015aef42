//! Persistence seam for the auth facade. Each adapter turns the generic user
//! and token operations into calls against one store; expected failures come
//! back as [`AppError::Auth`].

mod memory;
mod orm;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    auth::{
        AuthError, ChangePassword, NewUser, ProfileUpdate, RegisterForm, SessionUser, TokenData,
        UserQuery, password,
    },
    db::dao::PaginatedResponse,
    error::AppError,
};

pub use memory::MemoryAdapter;
pub use orm::SeaOrmAdapter;

#[async_trait]
pub trait DatabaseAdapter: Send + Sync {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<SessionUser>, AppError>;

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<SessionUser>, AppError>;

    /// Unknown email and wrong password both fail with `invalid_credentials`.
    async fn login_user(&self, email: &str, password: &str) -> Result<SessionUser, AppError>;

    async fn register_user(&self, form: &RegisterForm) -> Result<SessionUser, AppError>;

    /// Marks the token's user verified and consumes the token.
    async fn verify_email(&self, token: &str) -> Result<SessionUser, AppError>;

    async fn generate_password_reset_token(
        &self,
        email: &str,
        expires_in_minutes: i64,
    ) -> Result<TokenData, AppError>;

    async fn generate_email_verification_token(
        &self,
        email: &str,
        expires_in_minutes: i64,
    ) -> Result<TokenData, AppError>;

    async fn delete_password_reset_token(&self, token: &str) -> Result<(), AppError>;

    /// `invalid_token` when unknown; an expired token is removed and reported
    /// as `token_expired`.
    async fn validate_password_reset_token(&self, token: &str) -> Result<TokenData, AppError>;

    /// Leaves the token in place; the facade deletes it once the reset went through.
    async fn reset_user_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<SessionUser, AppError>;

    async fn change_user_password(&self, change: &ChangePassword) -> Result<(), AppError>;

    async fn update_user_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<SessionUser, AppError>;

    /// Removes the user together with their sessions and tokens.
    async fn delete_user(&self, id: Uuid) -> Result<(), AppError>;

    async fn list_users(&self, query: &UserQuery)
    -> Result<PaginatedResponse<SessionUser>, AppError>;

    async fn ensure_roles(&self, names: &[&str]) -> Result<(), AppError>;

    /// Creates `user` holding `roles` unless the email is taken. `None` when
    /// the user already existed.
    async fn seed_user(
        &self,
        user: NewUser,
        roles: &[&str],
    ) -> Result<Option<SessionUser>, AppError>;

    fn validate_password(&self, password: &str) -> bool {
        password::validate_password(password)
    }

    /// Field, email and password checks shared by every adapter's
    /// `register_user`. Returns the normalised user with a hashed password.
    fn prepare_registration(&self, form: &RegisterForm) -> Result<NewUser, AppError> {
        crate::auth::require_fields(&[
            ("firstName", form.first_name.as_deref()),
            ("lastName", form.last_name.as_deref()),
            ("email", form.email.as_deref()),
            ("password", form.password.as_deref()),
        ])?;

        let email = password::normalize_email(form.email.as_deref().unwrap_or_default());
        if !password::validate_email(&email) {
            return Err(AuthError::invalid_email().into());
        }

        let plain = form.password.as_deref().unwrap_or_default();
        if !self.validate_password(plain) {
            return Err(AuthError::invalid_password().into());
        }

        Ok(NewUser {
            email,
            first_name: form.first_name.as_deref().unwrap_or_default().trim().to_string(),
            last_name: form.last_name.as_deref().unwrap_or_default().trim().to_string(),
            password_hash: password::hash_password(plain)?,
        })
    }
}
