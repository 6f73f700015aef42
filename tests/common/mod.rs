#![allow(dead_code)]

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
    middleware,
    response::Response,
};
use tower::ServiceExt; // for `oneshot`

use breeze::{
    auth::bootstrap::{build_auth, seed_users},
    config::AppConfig,
    middleware::json_error_middleware,
    routes::router,
    state::AppState,
    toast::ToastStore,
};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "adminpass1";

pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.auth.cookie_secret = "integration-test-secret".to_string();
    cfg.auth.cookie_secure = Some(false);
    cfg.auth.seed_demo_users = false;
    cfg.auth.admin_email = Some(ADMIN_EMAIL.to_string());
    cfg.auth.admin_password = Some(ADMIN_PASSWORD.to_string());
    cfg
}

/// Memory-backed app with the admin account seeded.
pub async fn app() -> (Arc<AppState>, Router) {
    let cfg = test_config();
    let auth = build_auth(&cfg, None).expect("auth should build");
    seed_users(auth.adapter().as_ref(), &cfg.auth)
        .await
        .expect("seeding should succeed");
    let toasts = ToastStore::from_config(&cfg).expect("toast store should build");
    let state = AppState::new(cfg, None, auth, toasts);
    let app = Router::new()
        .merge(router(Arc::clone(&state)))
        .layer(middleware::from_fn(json_error_middleware));
    (state, app)
}

/// Replays cookies between requests the way a browser would.
pub struct Browser {
    app: Router,
    cookies: BTreeMap<String, String>,
}

impl Browser {
    pub fn new(app: Router) -> Self {
        Self {
            app,
            cookies: BTreeMap::new(),
        }
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub async fn get(&mut self, path: &str) -> Response {
        self.send(Request::get(path), Body::empty()).await
    }

    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> Response {
        let body = fields
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        self.send(
            Request::post(path).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded"),
            Body::from(body),
        )
        .await
    }

    async fn send(&mut self, mut builder: axum::http::request::Builder, body: Body) -> Response {
        if !self.cookies.is_empty() {
            let header_value = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, header_value);
        }
        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).expect("request should build"))
            .await
            .expect("request should be served");
        self.store(response.headers());
        response
    }

    fn store(&mut self, headers: &HeaderMap) {
        for value in headers.get_all(header::SET_COOKIE) {
            let raw = value.to_str().expect("set-cookie should be ascii");
            let Some((name, value)) = raw.split(';').next().and_then(|pair| pair.split_once('='))
            else {
                continue;
            };
            if raw.contains("Max-Age=0") {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), value.to_string());
            }
        }
    }
}

pub fn location(response: &Response) -> &str {
    assert_eq!(response.status(), StatusCode::FOUND, "expected a redirect");
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("redirect should carry a location")
}

pub async fn json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    serde_json::from_slice(&bytes).expect("body should be json")
}

pub async fn error_code(response: Response) -> String {
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    json(response).await["error"]["code"]
        .as_str()
        .expect("error envelope should carry a code")
        .to_string()
}

pub async fn register(browser: &mut Browser, email: &str, password: &str) -> Response {
    browser
        .post_form(
            "/auth/register",
            &[
                ("firstName", "Ada"),
                ("lastName", "Lovelace"),
                ("email", email),
                ("password", password),
            ],
        )
        .await
}

pub async fn login(browser: &mut Browser, email: &str, password: &str) -> Response {
    browser
        .post_form("/auth/login", &[("email", email), ("password", password)])
        .await
}
