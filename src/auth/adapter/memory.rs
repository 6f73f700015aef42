use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::DatabaseAdapter;
use crate::{
    auth::{
        AuthError, ChangePassword, NewUser, ProfileUpdate, RegisterForm, Role, SessionUser,
        TokenData, UserQuery, VerificationKind, full_name,
        password::{hash_password, normalize_email, verify_password},
        tokens::{expires_after, generate_token},
    },
    db::dao::{DaoLayerError, PaginatedResponse},
    error::AppError,
};

const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone)]
struct StoredUser {
    profile: SessionUser,
    password_hash: String,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct MemoryData {
    users: HashMap<Uuid, StoredUser>,
    roles: BTreeSet<String>,
    tokens: HashMap<String, TokenData>,
}

impl MemoryData {
    fn find_by_email(&self, email: &str) -> Option<&StoredUser> {
        self.users.values().find(|stored| stored.profile.email == email)
    }

    fn find_by_email_mut(&mut self, email: &str) -> Option<&mut StoredUser> {
        self.users
            .values_mut()
            .find(|stored| stored.profile.email == email)
    }

    fn insert(&mut self, user: NewUser, roles: &[&str]) -> SessionUser {
        let roles: Vec<String> = roles.iter().map(|role| role.to_string()).collect();
        self.roles.extend(roles.iter().cloned());

        let profile = SessionUser {
            id: Uuid::new_v4(),
            full_name: full_name(&user.first_name, &user.last_name),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            avatar: None,
            email_verified: false,
            roles,
        };
        self.users.insert(
            profile.id,
            StoredUser {
                profile: profile.clone(),
                password_hash: user.password_hash,
                created_at: Utc::now(),
            },
        );
        profile
    }

    fn issue(
        &mut self,
        email: &str,
        kind: VerificationKind,
        expires_at: DateTime<FixedOffset>,
    ) -> TokenData {
        let identifier = normalize_email(email);
        self.tokens
            .retain(|_, token| !(token.identifier == identifier && token.kind == kind));

        let data = TokenData {
            token: generate_token(),
            identifier,
            kind,
            expires_at,
        };
        self.tokens.insert(data.token.clone(), data.clone());
        data
    }

    fn validate(&mut self, token: &str, kind: VerificationKind) -> Result<TokenData, AuthError> {
        let data = self
            .tokens
            .get(token)
            .filter(|data| data.kind == kind)
            .cloned()
            .ok_or_else(AuthError::invalid_token)?;

        if data.is_expired() {
            self.tokens.remove(token);
            return Err(AuthError::token_expired());
        }
        Ok(data)
    }
}

/// Process-local adapter for development and tests. State is lost on restart.
#[derive(Default)]
pub struct MemoryAdapter {
    data: RwLock<MemoryData>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DatabaseAdapter for MemoryAdapter {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<SessionUser>, AppError> {
        let data = self.data.read().await;
        Ok(data
            .find_by_email(&normalize_email(email))
            .map(|stored| stored.profile.clone()))
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<SessionUser>, AppError> {
        let data = self.data.read().await;
        Ok(data.users.get(&id).map(|stored| stored.profile.clone()))
    }

    async fn login_user(&self, email: &str, password: &str) -> Result<SessionUser, AppError> {
        let stored = {
            let data = self.data.read().await;
            data.find_by_email(&normalize_email(email))
                .cloned()
                .ok_or_else(AuthError::invalid_credentials)?
        };

        if !verify_password(password, &stored.password_hash)? {
            return Err(AuthError::invalid_credentials().into());
        }
        Ok(stored.profile)
    }

    async fn register_user(&self, form: &RegisterForm) -> Result<SessionUser, AppError> {
        let new_user = self.prepare_registration(form)?;
        let mut data = self.data.write().await;
        if data.find_by_email(&new_user.email).is_some() {
            return Err(AuthError::user_already_exists().into());
        }
        Ok(data.insert(new_user, &[Role::User.as_str()]))
    }

    async fn verify_email(&self, token: &str) -> Result<SessionUser, AppError> {
        let mut data = self.data.write().await;
        let token_data = data.validate(token, VerificationKind::EmailVerification)?;

        let stored = data
            .find_by_email_mut(&token_data.identifier)
            .ok_or_else(AuthError::user_not_found)?;
        stored.profile.email_verified = true;
        let profile = stored.profile.clone();

        data.tokens.remove(token);
        Ok(profile)
    }

    async fn generate_password_reset_token(
        &self,
        email: &str,
        expires_in_minutes: i64,
    ) -> Result<TokenData, AppError> {
        let expires_at = expires_after(expires_in_minutes)?;
        let mut data = self.data.write().await;
        Ok(data.issue(email, VerificationKind::PasswordReset, expires_at))
    }

    async fn generate_email_verification_token(
        &self,
        email: &str,
        expires_in_minutes: i64,
    ) -> Result<TokenData, AppError> {
        let expires_at = expires_after(expires_in_minutes)?;
        let mut data = self.data.write().await;
        Ok(data.issue(email, VerificationKind::EmailVerification, expires_at))
    }

    async fn delete_password_reset_token(&self, token: &str) -> Result<(), AppError> {
        let mut data = self.data.write().await;
        match data.tokens.remove(token) {
            Some(_) => Ok(()),
            None => Err(AuthError::token_not_found().into()),
        }
    }

    async fn validate_password_reset_token(&self, token: &str) -> Result<TokenData, AppError> {
        let mut data = self.data.write().await;
        Ok(data.validate(token, VerificationKind::PasswordReset)?)
    }

    async fn reset_user_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<SessionUser, AppError> {
        let identifier = {
            let mut data = self.data.write().await;
            data.validate(token, VerificationKind::PasswordReset)?
                .identifier
        };
        if !self.validate_password(new_password) {
            return Err(AuthError::invalid_password().into());
        }

        let password_hash = hash_password(new_password)?;
        let mut data = self.data.write().await;
        let stored = data
            .find_by_email_mut(&identifier)
            .ok_or_else(AuthError::user_not_found)?;
        stored.password_hash = password_hash;
        Ok(stored.profile.clone())
    }

    async fn change_user_password(&self, change: &ChangePassword) -> Result<(), AppError> {
        let current_hash = {
            let data = self.data.read().await;
            data.users
                .get(&change.user_id)
                .map(|stored| stored.password_hash.clone())
                .ok_or_else(AuthError::user_not_found)?
        };

        if !verify_password(&change.current_password, &current_hash)? {
            return Err(AuthError::invalid_current_password().into());
        }
        if !self.validate_password(&change.new_password) {
            return Err(AuthError::invalid_password().into());
        }

        let password_hash = hash_password(&change.new_password)?;
        let mut data = self.data.write().await;
        let stored = data
            .users
            .get_mut(&change.user_id)
            .ok_or_else(AuthError::user_not_found)?;
        stored.password_hash = password_hash;
        Ok(())
    }

    async fn update_user_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<SessionUser, AppError> {
        let mut data = self.data.write().await;
        let stored = data.users.get_mut(&id).ok_or_else(AuthError::user_not_found)?;

        stored.profile.full_name = full_name(&update.first_name, &update.last_name);
        stored.profile.first_name = update.first_name.clone();
        stored.profile.last_name = update.last_name.clone();
        stored.profile.avatar = update.avatar.clone();
        Ok(stored.profile.clone())
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        let mut data = self.data.write().await;
        let removed = data.users.remove(&id).ok_or_else(AuthError::user_not_found)?;
        data.tokens
            .retain(|_, token| token.identifier != removed.profile.email);
        Ok(())
    }

    async fn list_users(
        &self,
        query: &UserQuery,
    ) -> Result<PaginatedResponse<SessionUser>, AppError> {
        if query.page == 0 || query.per_page == 0 || query.per_page > MAX_PAGE_SIZE {
            return Err(DaoLayerError::InvalidPagination {
                page: query.page,
                page_size: query.per_page,
            }
            .into());
        }

        let term = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty());
        let data = self.data.read().await;
        let mut matches: Vec<&StoredUser> = data
            .users
            .values()
            .filter(|stored| {
                term.is_none_or(|term| {
                    stored.profile.full_name.contains(term) || stored.profile.email.contains(term)
                })
            })
            .collect();
        matches.sort_by_key(|stored| stored.created_at);

        let total = matches.len() as u64;
        let offset = (query.page - 1).saturating_mul(query.per_page) as usize;
        let users: Vec<SessionUser> = matches
            .into_iter()
            .skip(offset)
            .take(query.per_page as usize)
            .map(|stored| stored.profile.clone())
            .collect();

        Ok(PaginatedResponse {
            has_next: (offset + users.len()) < total as usize,
            data: users,
            page: query.page,
            page_size: query.per_page,
            total: Some(total),
        })
    }

    async fn ensure_roles(&self, names: &[&str]) -> Result<(), AppError> {
        let mut data = self.data.write().await;
        data.roles.extend(names.iter().map(|name| name.to_string()));
        Ok(())
    }

    async fn seed_user(
        &self,
        user: NewUser,
        roles: &[&str],
    ) -> Result<Option<SessionUser>, AppError> {
        let mut data = self.data.write().await;
        if data.find_by_email(&user.email).is_some() {
            return Ok(None);
        }
        Ok(Some(data.insert(user, roles)))
    }
}
