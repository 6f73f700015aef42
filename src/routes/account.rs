use std::sync::Arc;

use axum::{
    Form, Router,
    extract::State,
    http::HeaderMap,
    response::Response,
    routing::{get, post},
};
use serde::Deserialize;

use crate::{
    auth::{ChangePassword, Outcome, ProfileUpdate},
    error::AppError,
    middleware::AuthUser,
    response::Redirect,
    services::ServiceContext,
    state::AppState,
    toast::Toast,
};

use super::json_with_cookies;

pub const ACCOUNT_URL: &str = "/account";
const NEW_PASSWORD_MIN_CHARS: usize = 8;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordForm {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_new_password: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/account", get(account))
        .route("/account/profile", post(update_profile))
        .route("/account/password", post(change_password))
        .route("/account/delete", post(delete_account))
        .with_state(state)
}

/// The signed-in user and any toast queued by the previous action.
async fn account(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (toast, cookie) = state.toasts.take(&headers).await?;
    json_with_cookies(vec![cookie], serde_json::json!({ "user": user, "toast": toast }))
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    headers: HeaderMap,
    Form(form): Form<ProfileForm>,
) -> Result<Redirect, AppError> {
    let update = ProfileUpdate {
        first_name: form.first_name,
        last_name: form.last_name,
        avatar: user.avatar.clone(),
    };
    let updated = ServiceContext::from_state(&state)
        .user()
        .update_profile(user.id, &update)
        .await?;

    let mut redirect = Redirect::to(ACCOUNT_URL);
    if let Outcome::Done(cookie) = state.auth.update_session(&headers, updated, None).await? {
        redirect = redirect.with_cookie(cookie);
    }
    let toast = state
        .toasts
        .set(&headers, Toast::success("Profile updated successfully"))
        .await?;
    Ok(redirect.with_cookie(toast))
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    headers: HeaderMap,
    Form(form): Form<ChangePasswordForm>,
) -> Result<Redirect, AppError> {
    check_password_change(&form)?;
    state
        .auth
        .change_password(&ChangePassword {
            user_id: user.id,
            current_password: form.current_password,
            new_password: form.new_password,
        })
        .await?;
    state
        .toasts
        .redirect(&headers, ACCOUNT_URL, Toast::success("Password updated successfully"))
        .await
}

async fn delete_account(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    headers: HeaderMap,
) -> Result<Redirect, AppError> {
    ServiceContext::from_state(&state)
        .user()
        .delete_user(user.id)
        .await?;

    let session = state.auth.get_session(&headers).await?;
    let cleared = state.auth.destroy_session(&session).await?;
    let toast = state
        .toasts
        .set(&headers, Toast::success("Account deleted successfully!"))
        .await?;
    Ok(Redirect::to("/").with_cookie(cleared).with_cookie(toast))
}

/// Stricter than the registration rule: mixed case, a digit and a symbol.
pub fn check_password_change(form: &ChangePasswordForm) -> Result<(), AppError> {
    if form.current_password.trim().is_empty() {
        return Err(AppError::bad_request("Current password must not be empty"));
    }

    let new = form.new_password.as_str();
    let problem = if new.chars().count() < NEW_PASSWORD_MIN_CHARS {
        Some("Password must be at least 8 characters")
    } else if !new.chars().any(|ch| ch.is_ascii_lowercase()) {
        Some("Password must contain at least one lowercase letter")
    } else if !new.chars().any(|ch| ch.is_ascii_uppercase()) {
        Some("Password must contain at least one uppercase letter")
    } else if !new.chars().any(|ch| ch.is_ascii_digit()) {
        Some("Password must contain at least one digit")
    } else if new.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        Some("Password must contain at least one special character")
    } else if form.confirm_new_password != form.new_password {
        Some("'New Password' and 'Confirm New Password' do not match")
    } else {
        None
    };

    match problem {
        Some(message) => Err(AppError::bad_request(message)),
        None => Ok(()),
    }
}
