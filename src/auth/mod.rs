pub mod adapter;
pub mod bootstrap;
pub mod breeze;
mod error;
pub mod password;
pub mod providers;
pub mod tokens;
mod types;

pub use breeze::{BreezeAuth, LinkOptions, Outcome, RequireAuthOptions, VerificationTarget};
pub use error::{AuthError, AuthErrorCode, INVALID_PASSWORD_MESSAGE, require_fields};
pub use types::{
    AdminRole, ChangePassword, Credentials, NewUser, ProfileUpdate, RegisterForm,
    RequiredRole, ResetPasswordForm, Role, SessionUser, TokenData, UserQuery, VerificationKind,
    full_name,
};
