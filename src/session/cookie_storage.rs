use async_trait::async_trait;
use axum::http::HeaderMap;

use super::{CookieOptions, CookieSigner, Session, SessionData, SessionStorage, read_cookie};
use crate::error::AppError;

/// Keeps the whole session payload in the signed cookie.
#[derive(Clone)]
pub struct CookieSessionStorage {
    options: CookieOptions,
    signer: CookieSigner,
}

impl CookieSessionStorage {
    pub fn new(options: CookieOptions) -> Result<Self, AppError> {
        let signer = CookieSigner::new(&options.secrets)?;
        Ok(Self { options, signer })
    }
}

#[async_trait]
impl SessionStorage for CookieSessionStorage {
    fn cookie(&self) -> &CookieOptions {
        &self.options
    }

    async fn get_session(&self, headers: &HeaderMap) -> Result<Session, AppError> {
        let data = read_cookie(headers, &self.options.name)
            .and_then(|value| self.signer.verify::<SessionData>(value))
            .unwrap_or_default();
        Ok(Session::from_parts(None, data))
    }

    async fn commit_session(&self, session: &Session) -> Result<String, AppError> {
        let value = self.signer.sign(session.data(), self.options.max_age_secs)?;
        Ok(self.options.set_cookie(&value))
    }

    async fn destroy_session(&self, _session: &Session) -> Result<String, AppError> {
        Ok(self.options.clear_cookie())
    }
}
