use std::sync::Arc;

use axum::{
    Router,
    http::header,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Serialize;

use crate::{auth::Outcome, error::AppError, response::JsonApiResponse, state::AppState};

pub mod account;
pub mod admin;
pub mod auth;
pub mod docs;
pub mod protected;
pub mod public;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(public::router(state.clone()))
        .merge(auth::router(state.clone()))
        .merge(account::router(state.clone()))
        .merge(protected::router(state.clone()))
        .merge(admin::router(state.clone()))
        .merge(docs::router(state))
}

/// Renders a facade outcome: the redirect as is, or the value in the JSON
/// envelope.
pub(crate) fn outcome_response<T: Serialize>(outcome: Outcome<T>) -> Result<Response, AppError> {
    match outcome {
        Outcome::Redirect(redirect) => Ok(redirect.into_response()),
        Outcome::Done(data) => Ok(JsonApiResponse::ok(data)?.into_response()),
    }
}

/// JSON envelope plus `Set-Cookie` headers.
pub(crate) fn json_with_cookies<T: Serialize>(
    cookies: Vec<String>,
    data: T,
) -> Result<Response, AppError> {
    let headers = AppendHeaders(
        cookies
            .into_iter()
            .map(|cookie| (header::SET_COOKIE, cookie)),
    );
    Ok((headers, JsonApiResponse::ok(data)?).into_response())
}
