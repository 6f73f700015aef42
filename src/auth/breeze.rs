//! `BreezeAuth` ties a [`DatabaseAdapter`] to a [`SessionStorage`] and exposes
//! the request-level auth flows: sign-up, sign-in, sign-out, password reset,
//! email verification and role gates.
//!
//! Domain failures come back as `Err(AppError::Auth(..))`. Guards reject with
//! `Err(AppError::Redirect(..))`, so handlers can `?` them straight into a
//! `302`. Successful sign-in and sign-out return a [`Redirect`] carrying the
//! session cookie.

use std::sync::Arc;

use axum::http::HeaderMap;

use super::{
    AuthError, ChangePassword, Credentials, ResetPasswordForm, SessionUser, TokenData,
    adapter::DatabaseAdapter,
    password,
    providers::{AuthProvider, AuthProviders, CredentialsProvider},
    require_fields,
};
use crate::{
    error::AppError,
    mail::MailMessage,
    response::Redirect,
    session::{Session, SessionMetadata, SessionStorage},
};

/// Either the value itself or, when the caller asked for one, a redirect.
#[derive(Debug)]
pub enum Outcome<T> {
    Done(T),
    Redirect(Redirect),
}

impl<T> Outcome<T> {
    pub fn redirect(self) -> Option<Redirect> {
        match self {
            Outcome::Redirect(redirect) => Some(redirect),
            Outcome::Done(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequireAuthOptions {
    pub if_not_authenticated_redirect_to: String,
    pub with_roles: Vec<String>,
    pub if_not_authorized_redirect_to: Option<String>,
}

impl RequireAuthOptions {
    pub fn redirect_to(url: impl Into<String>) -> Self {
        Self {
            if_not_authenticated_redirect_to: url.into(),
            with_roles: Vec::new(),
            if_not_authorized_redirect_to: None,
        }
    }

    pub fn with_roles<S: Into<String>>(mut self, roles: impl IntoIterator<Item = S>) -> Self {
        self.with_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn if_not_authorized_redirect_to(mut self, url: impl Into<String>) -> Self {
        self.if_not_authorized_redirect_to = Some(url.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct LinkOptions {
    pub expire_link_after_minutes: i64,
    pub on_success_redirect_to: Option<String>,
}

/// Who receives an email verification link.
#[derive(Debug, Clone, Copy)]
pub enum VerificationTarget<'a> {
    /// The user signed in on this request.
    Session(&'a HeaderMap),
    Email(&'a str),
}

#[derive(Clone)]
pub struct BreezeAuth {
    adapter: Arc<dyn DatabaseAdapter>,
    sessions: Arc<dyn SessionStorage>,
    providers: AuthProviders,
}

impl BreezeAuth {
    pub fn new(adapter: Arc<dyn DatabaseAdapter>, sessions: Arc<dyn SessionStorage>) -> Self {
        Self {
            adapter,
            sessions,
            providers: AuthProviders::new(),
        }
    }

    pub fn with_provider(mut self, provider: impl Into<AuthProvider>) -> Self {
        self.use_provider(provider);
        self
    }

    pub fn use_provider(&mut self, provider: impl Into<AuthProvider>) {
        self.providers.add(provider);
    }

    pub fn providers(&self) -> &[AuthProvider] {
        self.providers.all()
    }

    pub fn adapter(&self) -> &Arc<dyn DatabaseAdapter> {
        &self.adapter
    }

    pub fn validate_email(&self, email: &str) -> bool {
        password::validate_email(email)
    }

    fn credentials(&self) -> Result<&CredentialsProvider, AppError> {
        self.providers.credentials()
    }

    pub async fn get_session(&self, headers: &HeaderMap) -> Result<Session, AppError> {
        self.sessions.get_session(headers).await
    }

    pub async fn commit_session(&self, session: &Session) -> Result<String, AppError> {
        self.sessions.commit_session(session).await
    }

    pub async fn destroy_session(&self, session: &Session) -> Result<String, AppError> {
        self.sessions.destroy_session(session).await
    }

    pub async fn get_user_from_session(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<SessionUser>, AppError> {
        Ok(self.get_session(headers).await?.user().cloned())
    }

    pub async fn register_user(
        &self,
        form: &super::RegisterForm,
    ) -> Result<SessionUser, AppError> {
        self.credentials()?;
        let user = self.adapter.register_user(form).await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub async fn register_and_authenticate(
        &self,
        headers: &HeaderMap,
        form: &super::RegisterForm,
        redirect_to: &str,
    ) -> Result<Redirect, AppError> {
        let user = self.register_user(form).await?;
        self.sign_in(headers, user, redirect_to).await
    }

    /// Checks the email format first, then required fields, then the stored
    /// credentials.
    pub async fn authenticate_with_credentials(
        &self,
        headers: &HeaderMap,
        credentials: &Credentials,
        redirect_to: &str,
    ) -> Result<Redirect, AppError> {
        self.credentials()?;

        let email = credentials.email.as_deref().unwrap_or_default();
        if !self.validate_email(email.trim()) {
            return Err(AuthError::invalid_email().into());
        }
        require_fields(&[
            ("email", credentials.email.as_deref()),
            ("password", credentials.password.as_deref()),
        ])?;

        let user = match self
            .adapter
            .login_user(email, credentials.password.as_deref().unwrap_or_default())
            .await
        {
            Ok(user) => user,
            Err(err) => {
                if let Some(auth) = err.auth() {
                    tracing::warn!(code = %auth.code, "sign-in rejected");
                }
                return Err(err);
            }
        };
        tracing::info!(user_id = %user.id, "user signed in");
        self.sign_in(headers, user, redirect_to).await
    }

    async fn sign_in(
        &self,
        headers: &HeaderMap,
        user: SessionUser,
        redirect_to: &str,
    ) -> Result<Redirect, AppError> {
        let mut session = self.get_session(headers).await?;
        session.set_user(user);
        session.set_metadata(SessionMetadata::from_headers(headers));

        match self.commit_session(&session).await {
            Ok(cookie) => Ok(Redirect::to(redirect_to).with_cookie(cookie)),
            Err(err) => {
                tracing::error!("session commit failed, clearing session: {err}");
                let cleared = self.destroy_session(&session).await?;
                Ok(Redirect::to("/").with_cookie(cleared))
            }
        }
    }

    pub async fn logout(&self, headers: &HeaderMap, redirect_to: &str) -> Result<Redirect, AppError> {
        let session = self.get_session(headers).await?;
        if let Some(user) = session.user() {
            tracing::info!(user_id = %user.id, "user signed out");
        }
        let cleared = self.destroy_session(&session).await?;
        Ok(Redirect::to(redirect_to).with_cookie(cleared))
    }

    /// Replaces the user stored in the current session. Returns the new
    /// `Set-Cookie` value, or a redirect carrying it.
    pub async fn update_session(
        &self,
        headers: &HeaderMap,
        user: SessionUser,
        redirect_to: Option<&str>,
    ) -> Result<Outcome<String>, AppError> {
        let mut session = self.get_session(headers).await?;
        if session.user().is_none() {
            return Err(AuthError::not_authenticated().into());
        }

        session.set_user(user);
        let cookie = self.commit_session(&session).await?;
        Ok(match redirect_to {
            Some(to) => Outcome::Redirect(Redirect::to(to).with_cookie(cookie)),
            None => Outcome::Done(cookie),
        })
    }

    /// The current session when it holds a user with every required role.
    /// An anonymous request is redirected with its stale cookie cleared.
    pub async fn require_auth(
        &self,
        headers: &HeaderMap,
        options: &RequireAuthOptions,
    ) -> Result<Session, AppError> {
        let session = self.get_session(headers).await?;
        let Some(user) = session.user() else {
            let cleared = self.destroy_session(&session).await?;
            return Err(Redirect::to(&options.if_not_authenticated_redirect_to)
                .with_cookie(cleared)
                .into());
        };

        if !user.has_all_roles(&options.with_roles) {
            let to = options
                .if_not_authorized_redirect_to
                .as_deref()
                .unwrap_or("/");
            tracing::warn!(user_id = %user.id, roles = ?options.with_roles, "missing required role");
            return Err(Redirect::to(to).into());
        }
        Ok(session)
    }

    pub async fn require_role(
        &self,
        headers: &HeaderMap,
        role: &str,
        redirect_to: &str,
    ) -> Result<SessionUser, AppError> {
        self.require_user(headers, redirect_to, |user| user.has_role(role))
            .await
    }

    pub async fn require_all_roles(
        &self,
        headers: &HeaderMap,
        roles: &[&str],
        redirect_to: &str,
    ) -> Result<SessionUser, AppError> {
        self.require_user(headers, redirect_to, |user| user.has_all_roles(roles))
            .await
    }

    pub async fn require_some_roles(
        &self,
        headers: &HeaderMap,
        roles: &[&str],
        redirect_to: &str,
    ) -> Result<SessionUser, AppError> {
        self.require_user(headers, redirect_to, |user| user.has_some_role(roles))
            .await
    }

    async fn require_user(
        &self,
        headers: &HeaderMap,
        redirect_to: &str,
        allowed: impl FnOnce(&SessionUser) -> bool,
    ) -> Result<SessionUser, AppError> {
        match self.get_user_from_session(headers).await? {
            Some(user) if allowed(&user) => Ok(user),
            _ => Err(Redirect::to(redirect_to).into()),
        }
    }

    pub async fn redirect_if_authenticated(
        &self,
        headers: &HeaderMap,
        to: &str,
    ) -> Result<Session, AppError> {
        let session = self.get_session(headers).await?;
        if session.user().is_some() {
            return Err(Redirect::to(to).into());
        }
        Ok(session)
    }

    pub async fn send_password_reset_link(
        &self,
        email: Option<&str>,
        options: &LinkOptions,
    ) -> Result<Outcome<()>, AppError> {
        let provider = self.credentials()?;

        require_fields(&[("email", email)])?;
        let email = email.unwrap_or_default().trim();
        if !self.validate_email(email) {
            return Err(AuthError::invalid_email().into());
        }

        let user = self
            .adapter
            .get_user_by_email(&password::normalize_email(email))
            .await?
            .ok_or_else(AuthError::user_not_found)?;

        let page = provider.reset_password_page_url()?;
        let mailer = provider.mailer()?;

        let token = self
            .adapter
            .generate_password_reset_token(&user.email, options.expire_link_after_minutes)
            .await?;
        let link = link_with_token(page, &token.token, &user.email);

        if let Err(err) = mailer.send(&MailMessage::password_reset(&user.email, link)).await {
            tracing::error!(user_id = %user.id, "password reset email failed: {err}");
            return Err(AuthError::send_password_reset_email().into());
        }
        tracing::info!(user_id = %user.id, "password reset link sent");

        Ok(match options.on_success_redirect_to.as_deref() {
            Some(to) => Outcome::Redirect(Redirect::to(with_email_param(to, &user.email))),
            None => Outcome::Done(()),
        })
    }

    /// Required fields, then the token, then the confirmation, then the
    /// adapter's own password rules. The token is consumed on success.
    pub async fn reset_password(
        &self,
        form: &ResetPasswordForm,
        on_success_redirect_to: Option<&str>,
    ) -> Result<Outcome<SessionUser>, AppError> {
        self.credentials()?;

        require_fields(&[
            ("token", form.token.as_deref()),
            ("newPassword", form.new_password.as_deref()),
            ("confirmPassword", form.confirm_password.as_deref()),
        ])?;
        let token = form.token.as_deref().unwrap_or_default();
        let new_password = form.new_password.as_deref().unwrap_or_default();

        self.adapter.validate_password_reset_token(token).await?;
        if form.confirm_password.as_deref() != Some(new_password) {
            return Err(AuthError::passwords_do_not_match().into());
        }

        let user = self.adapter.reset_user_password(token, new_password).await?;
        self.adapter.delete_password_reset_token(token).await?;
        tracing::info!(user_id = %user.id, "password reset");

        Ok(match on_success_redirect_to {
            Some(to) => Outcome::Redirect(Redirect::to(with_email_param(to, &user.email))),
            None => Outcome::Done(user),
        })
    }

    pub async fn change_password(&self, change: &ChangePassword) -> Result<(), AppError> {
        self.credentials()?;
        self.adapter.change_user_password(change).await?;
        tracing::info!(user_id = %change.user_id, "password changed");
        Ok(())
    }

    pub async fn send_email_verification_link(
        &self,
        target: VerificationTarget<'_>,
        expire_link_after_minutes: i64,
    ) -> Result<(), AppError> {
        let provider = self.credentials()?;

        let user = match target {
            VerificationTarget::Session(headers) => self
                .get_user_from_session(headers)
                .await?
                .ok_or_else(AuthError::not_authenticated)?,
            VerificationTarget::Email(email) => self
                .adapter
                .get_user_by_email(email)
                .await?
                .ok_or_else(AuthError::user_not_found)?,
        };

        let page = provider.email_verification_page_url()?;
        let mailer = provider.mailer()?;

        let token = self
            .adapter
            .generate_email_verification_token(&user.email, expire_link_after_minutes)
            .await?;
        let link = link_with_token(page, &token.token, &user.email);

        if let Err(err) = mailer
            .send(&MailMessage::email_verification(&user.email, link))
            .await
        {
            tracing::error!(user_id = %user.id, "verification email failed: {err}");
            return Err(AuthError::send_email_verification_email().into());
        }
        tracing::info!(user_id = %user.id, "verification link sent");
        Ok(())
    }

    pub async fn verify_email(&self, token: &str) -> Result<SessionUser, AppError> {
        self.credentials()?;
        let user = self.adapter.verify_email(token).await?;
        tracing::info!(user_id = %user.id, "email verified");
        Ok(user)
    }

    pub async fn generate_password_reset_token(
        &self,
        email: &str,
        expires_after_minutes: i64,
    ) -> Result<TokenData, AppError> {
        self.credentials()?;
        let user = self
            .adapter
            .get_user_by_email(email)
            .await?
            .ok_or_else(AuthError::user_not_found)?;
        self.adapter
            .generate_password_reset_token(&user.email, expires_after_minutes)
            .await
    }

    pub async fn validate_password_reset_token(&self, token: &str) -> Result<TokenData, AppError> {
        self.credentials()?;
        self.adapter.validate_password_reset_token(token).await
    }
}

fn link_with_token(page: &str, token: &str, email: &str) -> String {
    format!("{page}?token={token}&email={}", urlencoding::encode(email))
}

fn with_email_param(to: &str, email: &str) -> String {
    let separator = if to.contains('?') { '&' } else { '?' };
    format!("{to}{separator}email={}", urlencoding::encode(email))
}
