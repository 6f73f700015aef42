use std::sync::Arc;

use axum::{Router, extract::State, http::HeaderMap, routing::get};

use crate::{
    response::{ApiResult, JsonApiResponse},
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new().route("/", get(index)).with_state(state)
}

async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> ApiResult<serde_json::Value> {
    let user = state.auth.get_user_from_session(&headers).await?;
    JsonApiResponse::ok(serde_json::json!({
        "ok": true,
        "app": state.config.general.app_name,
        "user": user,
    }))
}
