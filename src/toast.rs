//! One-shot notifications carried to the next page load in a dedicated
//! signed cookie.

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::{
    config::AppConfig,
    error::AppError,
    response::Redirect,
    session::{CookieOptions, CookieSessionStorage, SessionStorage},
};

const FLASH_KEY: &str = "toast";
const TOAST_MAX_AGE_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    #[serde(rename = "type")]
    pub kind: ToastKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Toast {
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            description: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Warning, message)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Clone)]
pub struct ToastStore {
    storage: CookieSessionStorage,
}

impl ToastStore {
    pub fn new(options: CookieOptions) -> Result<Self, AppError> {
        Ok(Self {
            storage: CookieSessionStorage::new(options)?,
        })
    }

    /// Shares the auth cookie secrets and flags under `toast.cookie_name`.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, AppError> {
        let options = CookieOptions {
            name: cfg.toast.cookie_name.clone(),
            max_age_secs: TOAST_MAX_AGE_SECS,
            ..CookieOptions::from_auth_config(&cfg.auth)
        };
        Self::new(options)
    }

    /// Queues `toast` and returns the `Set-Cookie` value to send.
    pub async fn set(&self, headers: &HeaderMap, toast: Toast) -> Result<String, AppError> {
        let mut session = self.storage.get_session(headers).await?;
        let value = serde_json::to_value(&toast)
            .map_err(|err| AppError::internal(format!("toast encode failed: {err}")))?;
        session.flash(FLASH_KEY, value);
        self.storage.commit_session(&session).await
    }

    pub async fn redirect(
        &self,
        headers: &HeaderMap,
        to: &str,
        toast: Toast,
    ) -> Result<Redirect, AppError> {
        Ok(Redirect::to(to).with_cookie(self.set(headers, toast).await?))
    }

    /// The queued toast, if any, and the `Set-Cookie` value that forgets it.
    pub async fn take(&self, headers: &HeaderMap) -> Result<(Option<Toast>, String), AppError> {
        let mut session = self.storage.get_session(headers).await?;
        let toast = session
            .take_flash(FLASH_KEY)
            .and_then(|value| match serde_json::from_value(value) {
                Ok(toast) => Some(toast),
                Err(err) => {
                    tracing::warn!("dropping unreadable toast: {err}");
                    None
                }
            });
        let cookie = self.storage.commit_session(&session).await?;
        Ok((toast, cookie))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header};

    use crate::{config::AppConfig, session::CookieOptions};

    use super::{Toast, ToastKind, ToastStore};

    fn store() -> ToastStore {
        ToastStore::new(CookieOptions::new(
            "__toast_session",
            vec!["toast-test-secret".to_string()],
        ))
        .expect("toast store should build")
    }

    fn request_with(set_cookie: &str) -> HeaderMap {
        let pair = set_cookie
            .split(';')
            .next()
            .expect("set-cookie should carry a name=value pair");
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(pair).expect("cookie should be a valid header"),
        );
        headers
    }

    #[tokio::test]
    async fn toast_is_read_once() {
        let store = store();
        let cookie = store
            .set(
                &HeaderMap::new(),
                Toast::success("Profile updated").with_description("All good"),
            )
            .await
            .expect("toast should be queued");

        let (first, cleared) = store
            .take(&request_with(&cookie))
            .await
            .expect("toast should be read");
        let (second, _) = store
            .take(&request_with(&cleared))
            .await
            .expect("second read should succeed");

        let first = first.expect("toast should be present");
        assert_eq!(first.kind, ToastKind::Success);
        assert_eq!(first.description.as_deref(), Some("All good"));
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn redirect_carries_the_toast_cookie() {
        let redirect = store()
            .redirect(&HeaderMap::new(), "/account", Toast::error("Nope"))
            .await
            .expect("redirect should build");

        assert_eq!(redirect.location(), "/account");
        assert!(redirect.cookies()[0].starts_with("__toast_session="));
    }

    #[test]
    fn toast_serializes_kind_as_type() {
        let json = serde_json::to_value(Toast::warning("Careful")).expect("toast should serialize");

        assert_eq!(json, serde_json::json!({"type": "warning", "message": "Careful"}));
    }

    #[test]
    fn from_config_uses_toast_cookie_name() {
        let mut cfg = AppConfig::default();
        cfg.auth.cookie_secret = "toast-config-secret".to_string();

        assert!(ToastStore::from_config(&cfg).is_ok());
        cfg.auth.cookie_secret = String::new();
        assert!(ToastStore::from_config(&cfg).is_err());
    }
}
