use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::session::SameSite;

use super::{defaults, envconfig::EnvConfig, validate};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub logging: LoggingConfig,
    pub database: Option<DatabaseConfig>,
    pub auth: AuthConfig,
    pub toast: ToastConfig,
    pub mail: MailConfig,
    pub docs: DocsConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        <Self as EnvConfig>::from_env()
    }
}

impl EnvConfig for AppConfig {
    fn validate(&self) -> Result<()> {
        validate::validate(self)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneralConfig {
    pub host: String,
    pub port: u16,
    pub app_name: String,
    /// Absolute origin prepended to links sent by email.
    pub app_base_url: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            host: defaults::DEFAULT_HOST.to_string(),
            port: defaults::DEFAULT_PORT as u16,
            app_name: defaults::DEFAULT_APP_NAME.to_string(),
            app_base_url: defaults::DEFAULT_APP_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub rust_log: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            rust_log: defaults::DEFAULT_RUST_LOG.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_db_min_idle")]
    pub min_idle: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStorageKind {
    #[default]
    Cookie,
    Database,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub cookie_name: String,
    /// Comma separated. The first secret signs new cookies, every secret is
    /// accepted when reading, which allows rotation.
    pub cookie_secret: String,
    pub cookie_max_age_secs: u64,
    pub cookie_same_site: SameSite,
    /// Defaults to `true` in release builds.
    pub cookie_secure: Option<bool>,
    pub cookie_http_only: bool,
    pub session_storage: SessionStorageKind,
    pub login_url: String,
    pub unauthorized_url: String,
    pub reset_password_page_url: Option<String>,
    pub email_verification_page_url: Option<String>,
    pub link_ttl_minutes: i64,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub seed_demo_users: bool,
}

impl AuthConfig {
    pub fn cookie_secrets(&self) -> Vec<String> {
        self.cookie_secret
            .split(',')
            .map(str::trim)
            .filter(|secret| !secret.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn secure_cookies(&self) -> bool {
        self.cookie_secure.unwrap_or(!cfg!(debug_assertions))
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: defaults::DEFAULT_SESSION_COOKIE_NAME.to_string(),
            cookie_secret: String::new(),
            cookie_max_age_secs: defaults::DEFAULT_SESSION_MAX_AGE_SECS as u64,
            cookie_same_site: SameSite::Lax,
            cookie_secure: None,
            cookie_http_only: true,
            session_storage: SessionStorageKind::Cookie,
            login_url: defaults::DEFAULT_LOGIN_URL.to_string(),
            unauthorized_url: defaults::DEFAULT_UNAUTHORIZED_URL.to_string(),
            reset_password_page_url: Some(defaults::DEFAULT_RESET_PASSWORD_PAGE_URL.to_string()),
            email_verification_page_url: Some(
                defaults::DEFAULT_EMAIL_VERIFICATION_PAGE_URL.to_string(),
            ),
            link_ttl_minutes: defaults::DEFAULT_LINK_TTL_MINUTES,
            admin_email: None,
            admin_password: None,
            seed_demo_users: cfg!(debug_assertions),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToastConfig {
    pub cookie_name: String,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            cookie_name: defaults::DEFAULT_TOAST_COOKIE_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MailProviderKind {
    #[default]
    Log,
    Resend,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MailConfig {
    pub provider: MailProviderKind,
    pub resend_api_key: Option<String>,
    pub email_domain: String,
    pub from: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: MailProviderKind::Log,
            resend_api_key: None,
            email_domain: defaults::DEFAULT_EMAIL_DOMAIN.to_string(),
            from: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocsConfig {
    pub base_url: String,
    pub no_cache: bool,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::DEFAULT_DOCS_BASE_URL.to_string(),
            no_cache: false,
        }
    }
}

fn default_db_max_connections() -> u32 {
    defaults::DEFAULT_DB_MAX_CONNECTIONS as u32
}

fn default_db_min_idle() -> u32 {
    defaults::DEFAULT_DB_MIN_IDLE as u32
}
