use std::sync::Arc;

use axum::{Router, routing::get};

use crate::{
    middleware::AuthUser,
    response::{ApiResult, JsonApiResponse},
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/dashboard", get(dashboard))
        .with_state(state)
}

async fn dashboard(AuthUser(user): AuthUser) -> ApiResult<serde_json::Value> {
    JsonApiResponse::ok(serde_json::json!({ "ok": true, "user": user }))
}
