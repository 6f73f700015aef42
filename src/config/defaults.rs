pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: i64 = 3000;
pub const DEFAULT_APP_NAME: &str = "Breeze";
pub const DEFAULT_APP_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_RUST_LOG: &str = "info,tower_http=info";
pub const DEFAULT_DB_MAX_CONNECTIONS: i64 = 10;
pub const DEFAULT_DB_MIN_IDLE: i64 = 2;

pub const DEFAULT_SESSION_COOKIE_NAME: &str = "__breeze-auth-session__";
pub const DEFAULT_SESSION_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;
pub const DEFAULT_LOGIN_URL: &str = "/auth/login";
pub const DEFAULT_UNAUTHORIZED_URL: &str = "/auth/unauthorized";
pub const DEFAULT_RESET_PASSWORD_PAGE_URL: &str = "/auth/reset-password";
pub const DEFAULT_EMAIL_VERIFICATION_PAGE_URL: &str = "/auth/verify-email";
pub const DEFAULT_LINK_TTL_MINUTES: i64 = 15;

pub const DEFAULT_TOAST_COOKIE_NAME: &str = "__toast_session";

pub const DEFAULT_EMAIL_DOMAIN: &str = "example.com";
pub const RESEND_API_URL: &str = "https://api.resend.com/emails";

pub const DEFAULT_DOCS_BASE_URL: &str = "http://localhost:3000";
