use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{auth::BreezeAuth, config::AppConfig, docs::DocsService, toast::ToastStore};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    /// `None` when running on the in-memory adapter.
    pub db: Option<DatabaseConnection>,
    pub auth: BreezeAuth,
    pub toasts: ToastStore,
    pub docs: Arc<DocsService>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: Option<DatabaseConnection>,
        auth: BreezeAuth,
        toasts: ToastStore,
    ) -> Arc<Self> {
        let docs = Arc::new(DocsService::from_config(&config.docs));
        Arc::new(Self {
            config,
            db,
            auth,
            toasts,
            docs,
        })
    }
}
