use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use breeze::{
    auth::bootstrap::init_auth,
    config::AppConfig,
    db::connection,
    logging::init_tracing,
    middleware::{catch_panic_layer, json_error_middleware},
    routes::router,
    state::AppState,
    toast::ToastStore,
};

#[tokio::main]
async fn main() {
    // No subscriber exists until the config is loaded.
    let cfg = match AppConfig::from_env().context("failed to load config") {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("{err:?}");
            std::process::exit(1);
        }
    };
    init_tracing(&cfg.logging);

    if let Err(err) = run(cfg).await {
        tracing::error!("server failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let db = match cfg.database.as_ref() {
        Some(db_cfg) => Some(connection::connect(db_cfg).await?),
        None => {
            tracing::warn!("no database configured, users and tokens live in memory");
            None
        }
    };

    let auth = init_auth(&cfg, db.as_ref()).await?;
    let toasts = ToastStore::from_config(&cfg)?;
    let state = AppState::new(cfg, db, auth, toasts);

    let app = Router::new()
        .merge(router(Arc::clone(&state)))
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", state.config.general.host, state.config.general.port)
        .parse()
        .context("invalid host/port")?;
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
