use async_trait::async_trait;
use axum::http::HeaderMap;
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::{CookieOptions, CookieSigner, Session, SessionData, SessionStorage, read_cookie};
use crate::{
    db::dao::{DaoBase, DaoLayerError, SessionDao},
    error::AppError,
};

/// Keeps the payload in the `sessions` table; the cookie only carries the
/// signed row id.
#[derive(Clone)]
pub struct DatabaseSessionStorage {
    options: CookieOptions,
    signer: CookieSigner,
    sessions: SessionDao,
}

impl DatabaseSessionStorage {
    pub fn new(options: CookieOptions, db: &DatabaseConnection) -> Result<Self, AppError> {
        let signer = CookieSigner::new(&options.secrets)?;
        Ok(Self {
            options,
            signer,
            sessions: SessionDao::new(db),
        })
    }

    fn expires_at(&self) -> Result<DateTime<FixedOffset>, AppError> {
        i64::try_from(self.options.max_age_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|delta| Utc::now().checked_add_signed(delta))
            .map(|at| at.fixed_offset())
            .ok_or_else(|| {
                AppError::misconfigured(format!(
                    "session max age of {}s is out of range",
                    self.options.max_age_secs
                ))
            })
    }

    fn encode(&self, data: &SessionData) -> Result<String, AppError> {
        serde_json::to_string(data)
            .map_err(|err| AppError::internal(format!("Session encoding failed: {err}")))
    }
}

#[async_trait]
impl SessionStorage for DatabaseSessionStorage {
    fn cookie(&self) -> &CookieOptions {
        &self.options
    }

    async fn get_session(&self, headers: &HeaderMap) -> Result<Session, AppError> {
        let Some(id) = read_cookie(headers, &self.options.name)
            .and_then(|value| self.signer.verify::<Uuid>(value))
        else {
            return Ok(Session::new());
        };

        let Some(row) = self.sessions.find_session(id).await? else {
            return Ok(Session::new());
        };

        if row.expires_at < Utc::now().fixed_offset() {
            self.sessions.delete_session(id).await?;
            return Ok(Session::new());
        }

        let data = match serde_json::from_str::<SessionData>(&row.data) {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(session_id = %id, "discarding unreadable session payload: {err}");
                SessionData::default()
            }
        };
        Ok(Session::from_parts(Some(id), data))
    }

    async fn commit_session(&self, session: &Session) -> Result<String, AppError> {
        let data = self.encode(session.data())?;
        let user_id = session.user().map(|user| user.id);
        let expires_at = self.expires_at()?;

        let saved = match session.id() {
            Some(id) => {
                match self
                    .sessions
                    .save_session(id, user_id, data.clone(), expires_at)
                    .await
                {
                    Ok(row) => row,
                    // Row was purged between read and commit.
                    Err(DaoLayerError::NotFound { .. }) => {
                        self.sessions
                            .create_session(user_id, data, expires_at)
                            .await?
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            None => {
                self.sessions
                    .create_session(user_id, data, expires_at)
                    .await?
            }
        };

        let value = self.signer.sign(&saved.id, self.options.max_age_secs)?;
        Ok(self.options.set_cookie(&value))
    }

    async fn destroy_session(&self, session: &Session) -> Result<String, AppError> {
        if let Some(id) = session.id() {
            self.sessions.delete_session(id).await?;
        }
        Ok(self.options.clear_cookie())
    }
}
