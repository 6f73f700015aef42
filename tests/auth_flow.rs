mod common;

use axum::http::StatusCode;

use breeze::{
    auth::{VerificationKind, adapter::DatabaseAdapter},
    config::defaults::DEFAULT_SESSION_COOKIE_NAME,
};

use common::{ADMIN_EMAIL, ADMIN_PASSWORD, Browser, app, error_code, json, location, login, register};

#[tokio::test]
async fn register_signs_in_and_opens_the_dashboard() {
    let (_, app) = app().await;
    let mut browser = Browser::new(app);

    let response = register(&mut browser, "ada@example.com", "abc123").await;
    assert_eq!(location(&response), "/dashboard");
    assert!(browser.has_cookie(DEFAULT_SESSION_COOKIE_NAME));

    let dashboard = browser.get("/dashboard").await;
    assert_eq!(dashboard.status(), StatusCode::OK);
    let body = json(dashboard).await;
    assert_eq!(body["data"]["user"]["email"], "ada@example.com");
    assert_eq!(body["data"]["user"]["roles"], serde_json::json!(["user"]));
}

#[tokio::test]
async fn anonymous_dashboard_redirects_to_login() {
    let (_, app) = app().await;
    let mut browser = Browser::new(app);

    let response = browser.get("/dashboard").await;

    assert_eq!(location(&response), "/auth/login");
}

#[tokio::test]
async fn tampered_session_cookie_is_treated_as_anonymous() {
    let (_, app) = app().await;
    let mut browser = Browser::new(app);
    register(&mut browser, "ada@example.com", "abc123").await;
    let value = browser
        .cookie(DEFAULT_SESSION_COOKIE_NAME)
        .expect("session cookie should be set")
        .to_string();
    browser.set_cookie(DEFAULT_SESSION_COOKIE_NAME, &format!("{value}x"));

    let response = browser.get("/dashboard").await;

    assert_eq!(location(&response), "/auth/login");
    assert!(!browser.has_cookie(DEFAULT_SESSION_COOKIE_NAME));
}

#[tokio::test]
async fn weak_password_is_rejected_with_code() {
    let (_, app) = app().await;
    let mut browser = Browser::new(app);

    let response = register(&mut browser, "ada@example.com", "test").await;

    assert_eq!(error_code(response).await, "invalid_password");
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let (_, app) = app().await;
    register(&mut Browser::new(app.clone()), "ada@example.com", "abc123").await;

    let response = register(&mut Browser::new(app), "ADA@example.com", "abc123").await;

    assert_eq!(error_code(response).await, "user_already_exists");
}

#[tokio::test]
async fn missing_field_reports_field_name() {
    let (_, app) = app().await;
    let mut browser = Browser::new(app);

    let response = browser
        .post_form("/auth/register", &[("firstName", "Ada"), ("email", "ada@example.com")])
        .await;

    assert_eq!(error_code(response).await, "lastName_required");
}

#[tokio::test]
async fn wrong_password_is_invalid_credentials() {
    let (_, app) = app().await;
    register(&mut Browser::new(app.clone()), "ada@example.com", "abc123").await;
    let mut browser = Browser::new(app);

    let response = login(&mut browser, "ada@example.com", "nope123").await;

    assert_eq!(error_code(response).await, "invalid_credentials");
    assert!(!browser.has_cookie(DEFAULT_SESSION_COOKIE_NAME));
}

#[tokio::test]
async fn signed_in_users_skip_the_login_form() {
    let (_, app) = app().await;
    let mut browser = Browser::new(app);
    register(&mut browser, "ada@example.com", "abc123").await;

    let response = login(&mut browser, "ada@example.com", "abc123").await;

    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn logout_clears_the_session() {
    let (_, app) = app().await;
    let mut browser = Browser::new(app);
    register(&mut browser, "ada@example.com", "abc123").await;

    let response = browser.post_form("/auth/logout", &[]).await;
    assert_eq!(location(&response), "/");
    assert!(!browser.has_cookie(DEFAULT_SESSION_COOKIE_NAME));

    let dashboard = browser.get("/dashboard").await;
    assert_eq!(location(&dashboard), "/auth/login");
}

#[tokio::test]
async fn forgot_password_for_unknown_user_fails() {
    let (_, app) = app().await;
    let mut browser = Browser::new(app);

    let response = browser
        .post_form("/auth/forgot-password", &[("email", "ghost@example.com")])
        .await;

    assert_eq!(error_code(response).await, "user_not_found");
}

#[tokio::test]
async fn password_reset_flow_consumes_the_token() {
    let (state, app) = app().await;
    register(&mut Browser::new(app.clone()), "ada@example.com", "abc123").await;
    let mut browser = Browser::new(app);

    let sent = browser
        .post_form("/auth/forgot-password", &[("email", "ada@example.com")])
        .await;
    assert_eq!(
        location(&sent),
        "/auth/reset-password-email-sent?email=ada%40example.com"
    );

    let token = state
        .auth
        .generate_password_reset_token("ada@example.com", 15)
        .await
        .expect("token should be issued")
        .token;
    let fields = [
        ("token", token.as_str()),
        ("newPassword", "fresh456"),
        ("confirmPassword", "fresh456"),
    ];

    let reset = browser.post_form("/auth/reset-password", &fields).await;
    assert_eq!(
        location(&reset),
        "/auth/reset-password-success?email=ada%40example.com"
    );

    let reused = browser.post_form("/auth/reset-password", &fields).await;
    assert_eq!(error_code(reused).await, "invalid_token");

    let signed_in = login(&mut browser, "ada@example.com", "fresh456").await;
    assert_eq!(location(&signed_in), "/dashboard");
}

#[tokio::test]
async fn reset_with_mismatched_confirmation_fails() {
    let (state, app) = app().await;
    register(&mut Browser::new(app.clone()), "ada@example.com", "abc123").await;
    let token = state
        .auth
        .generate_password_reset_token("ada@example.com", 15)
        .await
        .expect("token should be issued")
        .token;

    let response = Browser::new(app)
        .post_form(
            "/auth/reset-password",
            &[
                ("token", token.as_str()),
                ("newPassword", "fresh456"),
                ("confirmPassword", "fresh457"),
            ],
        )
        .await;

    assert_eq!(error_code(response).await, "passwords_do_not_match");
}

#[tokio::test]
async fn email_verification_refreshes_the_session() {
    let (state, app) = app().await;
    let mut browser = Browser::new(app);

    let anonymous = browser.post_form("/auth/send-verification", &[]).await;
    assert_eq!(error_code(anonymous).await, "not_authenticated");

    register(&mut browser, "ada@example.com", "abc123").await;
    let sent = browser.post_form("/auth/send-verification", &[]).await;
    assert_eq!(sent.status(), StatusCode::OK);

    let token = state
        .auth
        .adapter()
        .generate_email_verification_token("ada@example.com", 15)
        .await
        .expect("token should be issued");
    assert_eq!(token.kind, VerificationKind::EmailVerification);

    let verified = browser
        .get(&format!("/auth/verify-email?token={}", token.token))
        .await;
    assert_eq!(verified.status(), StatusCode::OK);
    assert_eq!(json(verified).await["data"]["user"]["emailVerified"], true);

    let dashboard = json(browser.get("/dashboard").await).await;
    assert_eq!(dashboard["data"]["user"]["emailVerified"], true);
}

#[tokio::test]
async fn admin_routes_require_the_admin_role() {
    let (_, app) = app().await;

    let mut member = Browser::new(app.clone());
    register(&mut member, "ada@example.com", "abc123").await;
    let denied = member.get("/admin/users").await;
    assert_eq!(location(&denied), "/auth/unauthorized");

    let mut admin = Browser::new(app);
    login(&mut admin, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let listed = admin.get("/admin/users?perPage=10&search=ada").await;
    assert_eq!(listed.status(), StatusCode::OK);
    let body = json(listed).await;
    assert_eq!(body["data"]["data"][0]["email"], "ada@example.com");
    assert_eq!(body["data"]["total"], 1);
}
