use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    config::{AppConfig, AuthConfig, SessionStorageKind},
    error::AppError,
    mail::build_mailer,
    session::{CookieOptions, CookieSessionStorage, DatabaseSessionStorage, SessionStorage},
};

use super::{
    BreezeAuth, NewUser, Role,
    adapter::{DatabaseAdapter, MemoryAdapter, SeaOrmAdapter},
    password,
    providers::CredentialsProvider,
};

pub const DEMO_PASSWORD: &str = "Password@123";

pub fn build_adapter(db: Option<&DatabaseConnection>) -> Arc<dyn DatabaseAdapter> {
    match db {
        Some(db) => Arc::new(SeaOrmAdapter::new(db)),
        None => Arc::new(MemoryAdapter::new()),
    }
}

pub fn build_session_storage(
    cfg: &AuthConfig,
    db: Option<&DatabaseConnection>,
) -> Result<Arc<dyn SessionStorage>, AppError> {
    let options = CookieOptions::from_auth_config(cfg);
    let storage: Arc<dyn SessionStorage> = match (cfg.session_storage, db) {
        (SessionStorageKind::Cookie, _) => Arc::new(CookieSessionStorage::new(options)?),
        (SessionStorageKind::Database, Some(db)) => {
            Arc::new(DatabaseSessionStorage::new(options, db)?)
        }
        (SessionStorageKind::Database, None) => {
            return Err(AppError::misconfigured(
                "database session storage needs a database connection",
            ));
        }
    };
    Ok(storage)
}

pub fn build_credentials_provider(cfg: &AppConfig) -> Result<CredentialsProvider, AppError> {
    let mut provider = CredentialsProvider::new().with_mailer(build_mailer(cfg)?);
    if let Some(url) = cfg.auth.reset_password_page_url.as_deref() {
        provider = provider.with_reset_password_page_url(url);
    }
    if let Some(url) = cfg.auth.email_verification_page_url.as_deref() {
        provider = provider.with_email_verification_page_url(url);
    }
    Ok(provider)
}

pub fn build_auth(cfg: &AppConfig, db: Option<&DatabaseConnection>) -> Result<BreezeAuth, AppError> {
    let auth = BreezeAuth::new(build_adapter(db), build_session_storage(&cfg.auth, db)?)
        .with_provider(build_credentials_provider(cfg)?);
    Ok(auth)
}

pub async fn init_auth(
    cfg: &AppConfig,
    db: Option<&DatabaseConnection>,
) -> anyhow::Result<BreezeAuth> {
    let auth = build_auth(cfg, db)?;
    seed_users(auth.adapter().as_ref(), &cfg.auth).await?;
    Ok(auth)
}

/// Creates the `user` and `admin` roles, the configured admin and, when
/// enabled, one demo account per role.
pub async fn seed_users(adapter: &dyn DatabaseAdapter, cfg: &AuthConfig) -> Result<(), AppError> {
    adapter
        .ensure_roles(&[Role::User.as_str(), Role::Admin.as_str()])
        .await?;

    if let (Some(email), Some(secret)) = (cfg.admin_email.as_deref(), cfg.admin_password.as_deref())
    {
        seed_one(adapter, email, "Admin", "User", secret, &[
            Role::Admin.as_str(),
            Role::User.as_str(),
        ])
        .await?;
    }

    if cfg.seed_demo_users {
        seed_one(adapter, "test@user.com", "Test", "User", DEMO_PASSWORD, &[
            Role::User.as_str(),
        ])
        .await?;
        seed_one(adapter, "test@admin.com", "Test", "Admin", DEMO_PASSWORD, &[
            Role::Admin.as_str(),
            Role::User.as_str(),
        ])
        .await?;
    }
    Ok(())
}

async fn seed_one(
    adapter: &dyn DatabaseAdapter,
    email: &str,
    first_name: &str,
    last_name: &str,
    secret: &str,
    roles: &[&str],
) -> Result<(), AppError> {
    let user = NewUser {
        email: password::normalize_email(email),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        password_hash: password::hash_password(secret)?,
    };
    match adapter.seed_user(user, roles).await? {
        Some(created) => tracing::info!(email = %created.email, ?roles, "seeded user"),
        None => tracing::info!(email = %password::normalize_email(email), "seed user already present"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderMap;

    use crate::{
        auth::{Credentials, adapter::DatabaseAdapter},
        config::{AppConfig, SessionStorageKind},
        error::AppError,
    };

    use super::{DEMO_PASSWORD, build_auth, build_session_storage, init_auth, seed_users};

    fn config() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.auth.cookie_secret = "bootstrap-test-secret-value".to_string();
        cfg.auth.seed_demo_users = true;
        cfg.auth.admin_email = Some("Root@Example.com".to_string());
        cfg.auth.admin_password = Some("rootpass1".to_string());
        cfg
    }

    #[tokio::test]
    async fn memory_auth_seeds_admin_and_demo_users() {
        let auth = init_auth(&config(), None)
            .await
            .expect("auth should initialise");

        let admin = auth
            .adapter()
            .get_user_by_email("root@example.com")
            .await
            .expect("lookup should succeed")
            .expect("admin should be seeded");
        let demo = auth
            .adapter()
            .login_user("test@admin.com", DEMO_PASSWORD)
            .await
            .expect("demo admin should log in");

        assert!(admin.has_role("admin"));
        assert!(demo.has_all_roles(&["admin", "user"]));
    }

    #[tokio::test]
    async fn seeding_twice_is_a_no_op() {
        let cfg = config();
        let auth = build_auth(&cfg, None).expect("auth should build");

        seed_users(auth.adapter().as_ref(), &cfg.auth)
            .await
            .expect("first seed should succeed");
        seed_users(auth.adapter().as_ref(), &cfg.auth)
            .await
            .expect("second seed should succeed");

        let redirect = auth
            .authenticate_with_credentials(
                &HeaderMap::new(),
                &Credentials {
                    email: Some("test@user.com".to_string()),
                    password: Some(DEMO_PASSWORD.to_string()),
                },
                "/dashboard",
            )
            .await
            .expect("demo user should sign in");
        assert_eq!(redirect.location(), "/dashboard");
    }

    #[test]
    fn database_sessions_without_database_are_misconfigured() {
        let mut cfg = config();
        cfg.auth.session_storage = SessionStorageKind::Database;

        let err = match build_session_storage(&cfg.auth, None) {
            Ok(_) => panic!("database sessions need a connection"),
            Err(err) => err,
        };
        assert!(matches!(err, AppError::Misconfigured(_)));
    }

    #[test]
    fn missing_cookie_secret_is_misconfigured() {
        let mut cfg = config();
        cfg.auth.cookie_secret = String::new();

        assert!(matches!(build_auth(&cfg, None), Err(AppError::Misconfigured(_))));
    }
}
