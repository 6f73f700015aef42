use std::sync::Arc;

use axum::{
    Form, Router,
    extract::{Query, State},
    http::HeaderMap,
    response::Response,
    routing::{get, post},
};
use serde::Deserialize;

use crate::{
    auth::{
        Credentials, LinkOptions, Outcome, RegisterForm, ResetPasswordForm, VerificationTarget,
        require_fields,
    },
    error::AppError,
    middleware::{GUEST_REDIRECT, Guest},
    response::Redirect,
    state::AppState,
};

use super::{json_with_cookies, outcome_response};

pub const RESET_EMAIL_SENT_URL: &str = "/auth/reset-password-email-sent";
pub const RESET_SUCCESS_URL: &str = "/auth/reset-password-success";

#[derive(Debug, Default, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/verify-email", get(verify_email))
        .route("/auth/send-verification", post(send_verification))
        .with_state(state)
}

async fn register(
    State(state): State<Arc<AppState>>,
    _guest: Guest,
    headers: HeaderMap,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, AppError> {
    state
        .auth
        .register_and_authenticate(&headers, &form, GUEST_REDIRECT)
        .await
}

async fn login(
    State(state): State<Arc<AppState>>,
    _guest: Guest,
    headers: HeaderMap,
    Form(credentials): Form<Credentials>,
) -> Result<Redirect, AppError> {
    state
        .auth
        .authenticate_with_credentials(&headers, &credentials, GUEST_REDIRECT)
        .await
}

async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Redirect, AppError> {
    state.auth.logout(&headers, "/").await
}

async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ForgotPasswordForm>,
) -> Result<Response, AppError> {
    let options = LinkOptions {
        expire_link_after_minutes: state.config.auth.link_ttl_minutes,
        on_success_redirect_to: Some(RESET_EMAIL_SENT_URL.to_string()),
    };
    let outcome = state
        .auth
        .send_password_reset_link(form.email.as_deref(), &options)
        .await?;
    outcome_response(outcome)
}

async fn reset_password(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Response, AppError> {
    let outcome = state
        .auth
        .reset_password(&form, Some(RESET_SUCCESS_URL))
        .await?;
    outcome_response(outcome)
}

/// Marks the address verified. A session belonging to the same user is
/// refreshed so it carries the new flag.
async fn verify_email(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<Response, AppError> {
    require_fields(&[("token", query.token.as_deref())])?;
    let token = query.token.as_deref().unwrap_or_default();
    let user = state.auth.verify_email(token).await?;

    let mut cookies = Vec::new();
    let signed_in = state.auth.get_user_from_session(&headers).await?;
    if signed_in.is_some_and(|current| current.id == user.id)
        && let Outcome::Done(cookie) = state
            .auth
            .update_session(&headers, user.clone(), None)
            .await?
    {
        cookies.push(cookie);
    }
    json_with_cookies(cookies, serde_json::json!({ "verified": true, "user": user }))
}

async fn send_verification(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    state
        .auth
        .send_email_verification_link(
            VerificationTarget::Session(&headers),
            state.config.auth.link_ttl_minutes,
        )
        .await?;
    json_with_cookies(Vec::new(), serde_json::json!({ "sent": true }))
}
