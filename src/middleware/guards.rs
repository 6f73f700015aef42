use std::{marker::PhantomData, sync::Arc};

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    auth::{RequireAuthOptions, RequiredRole, SessionUser},
    error::AppError,
    session::Session,
    state::AppState,
};

/// The signed-in user. Anonymous requests are redirected to `auth.login_url`
/// with the stale session cookie cleared.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionUser);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>().cloned() {
            return Ok(user);
        }

        let options = RequireAuthOptions::redirect_to(&state.config.auth.login_url);
        let session = state.auth.require_auth(&parts.headers, &options).await?;
        let user = session
            .user()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::internal("guarded session lost its user"))?;

        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// A signed-in user holding `R`'s role. Missing roles redirect to
/// `auth.unauthorized_url`.
pub struct AuthRoleGuard<R: RequiredRole> {
    pub user: SessionUser,
    _marker: PhantomData<R>,
}

impl<R> FromRequestParts<Arc<AppState>> for AuthRoleGuard<R>
where
    R: RequiredRole,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let options = RequireAuthOptions::redirect_to(&state.config.auth.login_url)
            .with_roles([R::required().as_str()])
            .if_not_authorized_redirect_to(&state.config.auth.unauthorized_url);
        let session = state.auth.require_auth(&parts.headers, &options).await?;
        let user = session
            .user()
            .cloned()
            .ok_or_else(|| AppError::internal("guarded session lost its user"))?;

        Ok(Self {
            user,
            _marker: PhantomData,
        })
    }
}

/// Lets only anonymous requests through; signed-in users go to the dashboard.
pub struct Guest(pub Session);

pub const GUEST_REDIRECT: &str = "/dashboard";

impl FromRequestParts<Arc<AppState>> for Guest {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let session = state
            .auth
            .redirect_if_authenticated(&parts.headers, GUEST_REDIRECT)
            .await?;
        Ok(Self(session))
    }
}
