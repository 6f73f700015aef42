use anyhow::{Result, bail};

use super::{AppConfig, MailProviderKind, SessionStorageKind};

const MIN_COOKIE_SECRET_LEN: usize = 16;
/// Browsers cap cookie lifetimes at 400 days.
pub const MAX_COOKIE_MAX_AGE_SECS: u64 = 400 * 24 * 60 * 60;
pub const MAX_LINK_TTL_MINUTES: i64 = 7 * 24 * 60;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if !cfg.general.app_base_url.starts_with("http://")
        && !cfg.general.app_base_url.starts_with("https://")
    {
        errors.push("general.app_base_url must start with http:// or https://".to_string());
    }

    if let Some(database) = cfg.database.as_ref() {
        if database.url.trim().is_empty() {
            errors.push("database.url must not be empty".to_string());
        }

        if database.min_idle > database.max_connections {
            errors.push(format!(
                "database.min_idle ({}) must be <= database.max_connections ({})",
                database.min_idle, database.max_connections
            ));
        }
    }

    let auth = &cfg.auth;
    let secrets = auth.cookie_secrets();
    if secrets.is_empty() {
        errors.push("auth.cookie_secret must not be empty".to_string());
    } else if secrets[0].len() < MIN_COOKIE_SECRET_LEN {
        errors.push(format!(
            "auth.cookie_secret must be at least {MIN_COOKIE_SECRET_LEN} characters"
        ));
    }

    if auth.cookie_name.trim().is_empty() {
        errors.push("auth.cookie_name must not be empty".to_string());
    }

    if auth.cookie_max_age_secs == 0 || auth.cookie_max_age_secs > MAX_COOKIE_MAX_AGE_SECS {
        errors.push(format!(
            "auth.cookie_max_age_secs must be between 1 and {MAX_COOKIE_MAX_AGE_SECS}"
        ));
    }

    if auth.session_storage == SessionStorageKind::Database && cfg.database.is_none() {
        errors.push("auth.session_storage = database requires a database section".to_string());
    }

    if auth.link_ttl_minutes <= 0 || auth.link_ttl_minutes > MAX_LINK_TTL_MINUTES {
        errors.push(format!(
            "auth.link_ttl_minutes must be between 1 and {MAX_LINK_TTL_MINUTES}"
        ));
    }

    match (auth.admin_email.as_deref(), auth.admin_password.as_deref()) {
        (Some(email), Some(password)) => {
            if email.trim().is_empty() {
                errors.push("auth.admin_email must not be empty".to_string());
            }
            if password.len() < 8 {
                errors.push("auth.admin_password must be at least 8 characters".to_string());
            }
        }
        (Some(_), None) | (None, Some(_)) => {
            errors.push("auth.admin_email and auth.admin_password must be set together".to_string());
        }
        (None, None) => {}
    }

    if cfg.toast.cookie_name.trim().is_empty() {
        errors.push("toast.cookie_name must not be empty".to_string());
    }

    if cfg.toast.cookie_name == auth.cookie_name {
        errors.push("toast.cookie_name must differ from auth.cookie_name".to_string());
    }

    if cfg.mail.provider == MailProviderKind::Resend
        && cfg
            .mail
            .resend_api_key
            .as_deref()
            .is_none_or(|key| key.trim().is_empty())
    {
        errors.push("mail.resend_api_key is required when mail.provider = resend".to_string());
    }

    if cfg.docs.base_url.trim().is_empty() {
        errors.push("docs.base_url must not be empty".to_string());
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}

#[cfg(test)]
mod tests {
    use crate::config::{AppConfig, DatabaseConfig, MailProviderKind, SessionStorageKind};

    use super::{MAX_COOKIE_MAX_AGE_SECS, MAX_LINK_TTL_MINUTES, validate};

    fn valid_config() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.auth.cookie_secret = "a-very-long-cookie-secret".to_string();
        cfg
    }

    #[test]
    fn accepts_defaults_with_secret() {
        validate(&valid_config()).expect("default config with a secret should validate");
    }

    #[test]
    fn missing_cookie_secret_is_rejected() {
        let err = validate(&AppConfig::default()).expect_err("missing secret should fail");

        assert!(err.to_string().contains("auth.cookie_secret must not be empty"));
    }

    #[test]
    fn collects_every_problem_in_one_error() {
        let mut cfg = valid_config();
        cfg.general.host = " ".to_string();
        cfg.auth.link_ttl_minutes = 0;
        cfg.auth.session_storage = SessionStorageKind::Database;
        cfg.mail.provider = MailProviderKind::Resend;

        let message = validate(&cfg).expect_err("config should fail").to_string();

        assert!(message.contains("general.host"));
        assert!(message.contains("auth.link_ttl_minutes"));
        assert!(message.contains("requires a database section"));
        assert!(message.contains("mail.resend_api_key"));
    }

    #[test]
    fn lifetimes_have_upper_bounds() {
        let mut cfg = valid_config();
        cfg.auth.cookie_max_age_secs = MAX_COOKIE_MAX_AGE_SECS + 1;
        cfg.auth.link_ttl_minutes = MAX_LINK_TTL_MINUTES + 1;

        let message = validate(&cfg).expect_err("config should fail").to_string();

        assert!(message.contains("auth.cookie_max_age_secs must be between"));
        assert!(message.contains("auth.link_ttl_minutes must be between"));
    }

    #[test]
    fn database_pool_bounds_are_checked() {
        let mut cfg = valid_config();
        cfg.database = Some(DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_idle: 4,
        });

        let message = validate(&cfg).expect_err("config should fail").to_string();

        assert!(message.contains("database.min_idle (4)"));
    }

    #[test]
    fn admin_credentials_must_come_in_pairs() {
        let mut cfg = valid_config();
        cfg.auth.admin_email = Some("admin@example.com".to_string());

        let message = validate(&cfg).expect_err("config should fail").to_string();

        assert!(message.contains("must be set together"));
    }

    #[test]
    fn rotated_secrets_are_split_on_commas() {
        let mut cfg = valid_config();
        cfg.auth.cookie_secret = "current-secret-value, previous-secret ,".to_string();

        assert_eq!(
            cfg.auth.cookie_secrets(),
            vec!["current-secret-value".to_string(), "previous-secret".to_string()]
        );
    }
}
