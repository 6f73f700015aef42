//! Delivery of password reset and email verification links.
//!
//! `LogMailer` is the development default and only logs the message.
//! `ResendMailer` posts to the Resend HTTP API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::{
    config::{AppConfig, MailProviderKind, defaults},
    error::AppError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailKind {
    PasswordReset,
    EmailVerification,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub kind: MailKind,
    pub to: String,
    /// Site-relative or absolute link the recipient should follow.
    pub link: String,
}

impl MailMessage {
    pub fn password_reset(to: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            kind: MailKind::PasswordReset,
            to: to.into(),
            link: link.into(),
        }
    }

    pub fn email_verification(to: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            kind: MailKind::EmailVerification,
            to: to.into(),
            link: link.into(),
        }
    }

    pub fn subject(&self, app_name: &str) -> String {
        match self.kind {
            MailKind::PasswordReset => format!("Reset your {app_name} password"),
            MailKind::EmailVerification => format!("Verify your {app_name} email address"),
        }
    }

    pub fn text(&self, base_url: &str) -> String {
        let link = absolute_link(base_url, &self.link);
        match self.kind {
            MailKind::PasswordReset => format!(
                "Someone asked to reset the password for this account.\n\n\
                 Follow this link to choose a new one: {link}\n\n\
                 If it was not you, ignore this email."
            ),
            MailKind::EmailVerification => {
                format!("Confirm your email address by following this link: {link}")
            }
        }
    }
}

fn absolute_link(base_url: &str, link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        return link.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        link.trim_start_matches('/')
    )
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), AppError>;
}

#[derive(Debug, Clone)]
pub struct LogMailer {
    base_url: String,
}

impl LogMailer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), AppError> {
        tracing::info!(
            to = %message.to,
            kind = ?message.kind,
            link = %absolute_link(&self.base_url, &message.link),
            "mail delivery stub"
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: String,
    text: String,
}

#[derive(Debug, Clone)]
pub struct ResendMailer {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
    app_name: String,
    base_url: String,
}

impl ResendMailer {
    pub fn from_config(cfg: &AppConfig) -> Result<Self, AppError> {
        let api_key = cfg
            .mail
            .resend_api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AppError::misconfigured("mail.resend_api_key is not set"))?;

        Ok(Self {
            client: Client::new(),
            api_url: defaults::RESEND_API_URL.to_string(),
            api_key,
            from: sender_address(cfg),
            app_name: cfg.general.app_name.clone(),
            base_url: cfg.general.app_base_url.clone(),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), AppError> {
        let body = ResendEmail {
            from: &self.from,
            to: [message.to.as_str()],
            subject: message.subject(&self.app_name),
            text: message.text(&self.base_url),
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| AppError::internal(format!("Resend request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::internal(format!(
                "Resend rejected message: {status} {detail}"
            )));
        }
        Ok(())
    }
}

/// `mail.from`, or `"{app_name} <no-reply@{email_domain}>"`.
pub fn sender_address(cfg: &AppConfig) -> String {
    cfg.mail.from.clone().unwrap_or_else(|| {
        format!(
            "{} <no-reply@{}>",
            cfg.general.app_name, cfg.mail.email_domain
        )
    })
}

pub fn build_mailer(cfg: &AppConfig) -> Result<Arc<dyn Mailer>, AppError> {
    let mailer: Arc<dyn Mailer> = match cfg.mail.provider {
        MailProviderKind::Log => Arc::new(LogMailer::new(cfg.general.app_base_url.clone())),
        MailProviderKind::Resend => Arc::new(ResendMailer::from_config(cfg)?),
    };
    Ok(mailer)
}

#[cfg(test)]
mod tests {
    use crate::config::{AppConfig, MailProviderKind};

    use super::{MailMessage, Mailer, absolute_link, build_mailer, sender_address};

    #[test]
    fn relative_links_get_the_base_url() {
        assert_eq!(
            absolute_link("http://localhost:3000/", "/auth/reset-password?token=t"),
            "http://localhost:3000/auth/reset-password?token=t"
        );
        assert_eq!(
            absolute_link("http://localhost:3000", "https://other.example/x"),
            "https://other.example/x"
        );
    }

    #[test]
    fn message_text_embeds_absolute_link() {
        let message = MailMessage::password_reset("ada@example.com", "/auth/reset?token=abc");

        assert!(message.text("https://app.example").contains("https://app.example/auth/reset?token=abc"));
        assert_eq!(message.subject("Breeze"), "Reset your Breeze password");
    }

    #[test]
    fn sender_defaults_to_no_reply_on_domain() {
        let mut cfg = AppConfig::default();
        cfg.mail.email_domain = "breeze.dev".to_string();

        assert_eq!(sender_address(&cfg), "Breeze <no-reply@breeze.dev>");
    }

    #[test]
    fn resend_without_key_is_misconfigured() {
        let mut cfg = AppConfig::default();
        cfg.mail.provider = MailProviderKind::Resend;

        let err = match build_mailer(&cfg) {
            Ok(_) => panic!("missing api key should fail"),
            Err(err) => err,
        };
        assert!(err.message().contains("mail.resend_api_key"));
    }

    #[tokio::test]
    async fn log_mailer_always_delivers() {
        let mailer = build_mailer(&AppConfig::default()).expect("log mailer should build");

        mailer
            .send(&MailMessage::email_verification("ada@example.com", "/verify?token=t"))
            .await
            .expect("log delivery should succeed");
    }
}
