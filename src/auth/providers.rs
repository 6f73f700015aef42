use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{error::AppError, mail::Mailer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProviderId {
    Credentials,
}

impl AuthProviderId {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthProviderId::Credentials => "credentials",
        }
    }
}

/// Email + password sign-in. The page URLs and mailer are only needed by the
/// password reset and email verification flows.
#[derive(Clone, Default)]
pub struct CredentialsProvider {
    pub reset_password_page_url: Option<String>,
    pub email_verification_page_url: Option<String>,
    pub mailer: Option<Arc<dyn Mailer>>,
}

impl CredentialsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reset_password_page_url(mut self, url: impl Into<String>) -> Self {
        self.reset_password_page_url = Some(url.into());
        self
    }

    pub fn with_email_verification_page_url(mut self, url: impl Into<String>) -> Self {
        self.email_verification_page_url = Some(url.into());
        self
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub(crate) fn reset_password_page_url(&self) -> Result<&str, AppError> {
        self.reset_password_page_url.as_deref().ok_or_else(|| {
            AppError::misconfigured("resetPasswordPageUrl is not set on the credentials provider")
        })
    }

    pub(crate) fn email_verification_page_url(&self) -> Result<&str, AppError> {
        self.email_verification_page_url.as_deref().ok_or_else(|| {
            AppError::misconfigured(
                "emailVerificationPageUrl is not set on the credentials provider",
            )
        })
    }

    pub(crate) fn mailer(&self) -> Result<&dyn Mailer, AppError> {
        self.mailer
            .as_deref()
            .ok_or_else(|| AppError::misconfigured("no mailer is set on the credentials provider"))
    }
}

impl std::fmt::Debug for CredentialsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsProvider")
            .field("reset_password_page_url", &self.reset_password_page_url)
            .field("email_verification_page_url", &self.email_verification_page_url)
            .field("mailer", &self.mailer.is_some())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum AuthProvider {
    Credentials(CredentialsProvider),
}

impl AuthProvider {
    pub fn id(&self) -> AuthProviderId {
        match self {
            AuthProvider::Credentials(_) => AuthProviderId::Credentials,
        }
    }
}

impl From<CredentialsProvider> for AuthProvider {
    fn from(provider: CredentialsProvider) -> Self {
        AuthProvider::Credentials(provider)
    }
}

/// Ordered provider list. Later registrations of the same kind are kept but
/// never consulted.
#[derive(Debug, Clone, Default)]
pub struct AuthProviders {
    providers: Vec<AuthProvider>,
}

impl AuthProviders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: impl Into<AuthProvider>) -> Self {
        self.add(provider);
        self
    }

    pub fn add(&mut self, provider: impl Into<AuthProvider>) {
        let provider = provider.into();
        if self.providers.iter().any(|known| known.id() == provider.id()) {
            tracing::warn!(
                provider = provider.id().as_str(),
                "provider already registered; the first one stays in use"
            );
        }
        self.providers.push(provider);
    }

    pub fn all(&self) -> &[AuthProvider] {
        &self.providers
    }

    pub fn credentials(&self) -> Result<&CredentialsProvider, AppError> {
        self.providers
            .iter()
            .map(|provider| match provider {
                AuthProvider::Credentials(credentials) => credentials,
            })
            .next()
            .ok_or_else(|| AppError::misconfigured("No credentials provider found in the configuration"))
    }
}
