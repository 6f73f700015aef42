use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{HeaderMap, header};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{config::AuthConfig, error::AppError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    #[default]
    Lax,
    Strict,
    None,
}

impl SameSite {
    pub fn as_str(self) -> &'static str {
        match self {
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
            SameSite::None => "None",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CookieOptions {
    pub name: String,
    /// The first secret signs, every secret verifies.
    pub secrets: Vec<String>,
    pub max_age_secs: u64,
    pub path: String,
    pub same_site: SameSite,
    pub secure: bool,
    pub http_only: bool,
}

impl CookieOptions {
    pub fn new(name: impl Into<String>, secrets: Vec<String>) -> Self {
        Self {
            name: name.into(),
            secrets,
            max_age_secs: 30 * 24 * 60 * 60,
            path: "/".to_string(),
            same_site: SameSite::Lax,
            secure: false,
            http_only: true,
        }
    }

    pub fn from_auth_config(cfg: &AuthConfig) -> Self {
        Self {
            max_age_secs: cfg.cookie_max_age_secs,
            same_site: cfg.cookie_same_site,
            secure: cfg.secure_cookies(),
            http_only: cfg.cookie_http_only,
            ..Self::new(cfg.cookie_name.clone(), cfg.cookie_secrets())
        }
    }

    /// `Set-Cookie` value carrying `value` for `max_age_secs`.
    pub fn set_cookie(&self, value: &str) -> String {
        self.render(value, self.max_age_secs)
    }

    /// `Set-Cookie` value that makes the browser drop the cookie.
    pub fn clear_cookie(&self) -> String {
        format!(
            "{}; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            self.render("", 0)
        )
    }

    fn render(&self, value: &str, max_age: u64) -> String {
        let mut cookie = format!(
            "{}={}; Path={}; Max-Age={}; SameSite={}",
            self.name,
            value,
            self.path,
            max_age,
            self.same_site.as_str()
        );
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        // Browsers reject SameSite=None without Secure.
        if self.secure || self.same_site == SameSite::None {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Value of the cookie called `name` across every `Cookie` header.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Serialize, Deserialize)]
struct SignedPayload<T> {
    iat: u64,
    exp: u64,
    data: T,
}

/// HS256 signer for cookie payloads, with key rotation.
#[derive(Clone)]
pub struct CookieSigner {
    encoding: EncodingKey,
    decoding: Vec<DecodingKey>,
}

impl CookieSigner {
    pub fn new(secrets: &[String]) -> Result<Self, AppError> {
        let Some(current) = secrets.first() else {
            return Err(AppError::misconfigured(
                "a cookie secret is required to sign sessions",
            ));
        };
        Ok(Self {
            encoding: EncodingKey::from_secret(current.as_bytes()),
            decoding: secrets
                .iter()
                .map(|secret| DecodingKey::from_secret(secret.as_bytes()))
                .collect(),
        })
    }

    pub fn sign<T: Serialize>(&self, data: &T, ttl_secs: u64) -> Result<String, AppError> {
        let iat = now_unix();
        let payload = SignedPayload {
            iat,
            exp: iat.saturating_add(ttl_secs),
            data,
        };
        encode(&Header::new(Algorithm::HS256), &payload, &self.encoding)
            .map_err(|err| AppError::internal(format!("Cookie signing failed: {err}")))
    }

    /// `None` when the value is malformed, expired, or signed by an unknown key.
    pub fn verify<T: DeserializeOwned>(&self, value: &str) -> Option<T> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        self.decoding.iter().find_map(|key| {
            decode::<SignedPayload<T>>(value, key, &validation)
                .ok()
                .map(|token| token.claims.data)
        })
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}
