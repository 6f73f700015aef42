use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use crate::{
    auth::{AdminRole, SessionUser, UserQuery},
    db::dao::PaginatedResponse,
    middleware::AuthRoleGuard,
    response::{ApiResult, JsonApiResponse},
    services::ServiceContext,
    state::AppState,
};

const DEFAULT_PER_PAGE: u64 = 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersParams {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub search: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/admin/users", get(list_users))
        .with_state(state)
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    guard: AuthRoleGuard<AdminRole>,
    Query(params): Query<ListUsersParams>,
) -> ApiResult<PaginatedResponse<SessionUser>> {
    tracing::debug!(admin = %guard.user.id, "listing users");
    let query = UserQuery {
        page: params.page.unwrap_or(1),
        per_page: params.per_page.unwrap_or(DEFAULT_PER_PAGE),
        search: params.search.filter(|search| !search.trim().is_empty()),
    };
    let users = ServiceContext::from_state(&state).user().list_users(&query).await?;
    JsonApiResponse::ok(users)
}
