use std::sync::Arc;

use crate::{auth::adapter::DatabaseAdapter, state::AppState};

use super::user_service::UserService;

#[derive(Clone)]
pub struct ServiceContext {
    adapter: Arc<dyn DatabaseAdapter>,
}

impl ServiceContext {
    pub fn new(adapter: Arc<dyn DatabaseAdapter>) -> Self {
        Self { adapter }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(Arc::clone(state.auth.adapter()))
    }

    pub fn user(&self) -> UserService {
        UserService::new(Arc::clone(&self.adapter))
    }
}
