//! Sessions keyed by a signed cookie. The payload lives either in the cookie
//! itself ([`CookieSessionStorage`]) or in the `sessions` table
//! ([`DatabaseSessionStorage`]), behind the same [`SessionStorage`] trait.

mod cookie;
mod cookie_storage;
mod database_storage;

use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{auth::SessionUser, error::AppError};

pub use cookie::{CookieOptions, CookieSigner, SameSite, read_cookie};
pub use cookie_storage::CookieSessionStorage;
pub use database_storage::DatabaseSessionStorage;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    pub user_agent: Option<String>,
}

impl SessionMetadata {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            user_agent: headers
                .get(axum::http::header::USER_AGENT)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
    #[serde(default)]
    pub metadata: SessionMetadata,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub flash: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    id: Option<Uuid>,
    data: SessionData,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(id: Option<Uuid>, data: SessionData) -> Self {
        Self { id, data }
    }

    /// Server-side id; `None` for cookie-only sessions and sessions not yet committed.
    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.data.user.as_ref()
    }

    pub fn set_user(&mut self, user: SessionUser) {
        self.data.user = Some(user);
    }

    pub fn metadata(&self) -> &SessionMetadata {
        &self.data.metadata
    }

    pub fn set_metadata(&mut self, metadata: SessionMetadata) {
        self.data.metadata = metadata;
    }

    /// Stores a value that is handed out once by [`Session::take_flash`].
    pub fn flash(&mut self, key: impl Into<String>, value: Value) {
        self.data.flash.insert(key.into(), value);
    }

    pub fn take_flash(&mut self, key: &str) -> Option<Value> {
        self.data.flash.remove(key)
    }
}

#[async_trait]
pub trait SessionStorage: Send + Sync {
    fn cookie(&self) -> &CookieOptions;

    /// Reads the session named by the request's `Cookie` header. A missing,
    /// tampered or expired cookie yields an empty session.
    async fn get_session(&self, headers: &HeaderMap) -> Result<Session, AppError>;

    /// Persists the session and returns the `Set-Cookie` value.
    async fn commit_session(&self, session: &Session) -> Result<String, AppError>;

    /// Drops the session and returns a `Set-Cookie` value that clears it.
    async fn destroy_session(&self, session: &Session) -> Result<String, AppError>;
}
