use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    docs::{Doc, MenuDoc},
    response::{ApiResult, JsonApiResponse},
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/docs/versions", get(versions))
        .route("/docs/{lang}/{version}/menu", get(menu))
        .route("/docs/{lang}/{version}/{*path}", get(doc))
        .with_state(state)
}

async fn versions(State(state): State<Arc<AppState>>) -> ApiResult<Vec<String>> {
    JsonApiResponse::ok(state.docs.versions().await?)
}

async fn menu(
    State(state): State<Arc<AppState>>,
    Path((lang, version)): Path<(String, String)>,
) -> ApiResult<Vec<MenuDoc>> {
    JsonApiResponse::ok(state.docs.menu(&lang, &version).await?)
}

async fn doc(
    State(state): State<Arc<AppState>>,
    Path((lang, version, path)): Path<(String, String, String)>,
) -> ApiResult<Doc> {
    JsonApiResponse::ok(state.docs.doc(&lang, &version, &path).await?)
}
