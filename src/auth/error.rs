use std::fmt;

use serde::{Serialize, Serializer, ser::SerializeStruct};
use thiserror::Error;

pub const INVALID_PASSWORD_MESSAGE: &str =
    "Password must contain letters and numbers and be at least 6 characters long";
const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";
const SEND_EMAIL_MESSAGE: &str = "Error sending email. Please try again";

/// Machine readable reason an auth operation was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    /// A required form field was missing or blank; carries the field name
    /// as submitted, e.g. `newPassword`.
    Required(&'static str),
    InvalidEmail,
    InvalidPassword,
    InvalidCredentials,
    InvalidCurrentPassword,
    UserAlreadyExists,
    UserNotFound,
    InvalidToken,
    TokenExpired,
    TokenNotFound,
    PasswordsDoNotMatch,
    NotAuthenticated,
    SendPasswordResetEmail,
    SendEmailVerificationEmail,
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::Required(field) => return write!(f, "{field}_required"),
            Self::InvalidEmail => "invalid_email",
            Self::InvalidPassword => "invalid_password",
            Self::InvalidCredentials => "invalid_credentials",
            Self::InvalidCurrentPassword => "invalid_current_password",
            Self::UserAlreadyExists => "user_already_exists",
            Self::UserNotFound => "user_not_found",
            Self::InvalidToken => "invalid_token",
            Self::TokenExpired => "token_expired",
            Self::TokenNotFound => "token_not_found",
            Self::PasswordsDoNotMatch => "passwords_do_not_match",
            Self::NotAuthenticated => "not_authenticated",
            Self::SendPasswordResetEmail => "send_password_reset_email_error",
            Self::SendEmailVerificationEmail => "send_email_verification_email_error",
        };
        f.write_str(code)
    }
}

impl Serialize for AuthErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({code})")]
pub struct AuthError {
    pub code: AuthErrorCode,
    pub message: String,
}

impl Serialize for AuthError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AuthError", 2)?;
        state.serialize_field("code", &self.code)?;
        state.serialize_field("message", &self.message)?;
        state.end()
    }
}

impl AuthError {
    pub fn new(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn required(field: &'static str) -> Self {
        Self::new(AuthErrorCode::Required(field), format!("{field} is required"))
    }

    pub fn invalid_email() -> Self {
        Self::new(AuthErrorCode::InvalidEmail, "Invalid email address")
    }

    pub fn invalid_password() -> Self {
        Self::new(AuthErrorCode::InvalidPassword, INVALID_PASSWORD_MESSAGE)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(AuthErrorCode::InvalidCredentials, "Invalid credentials")
    }

    pub fn invalid_current_password() -> Self {
        Self::new(AuthErrorCode::InvalidCurrentPassword, "Invalid current password")
    }

    pub fn user_already_exists() -> Self {
        Self::new(
            AuthErrorCode::UserAlreadyExists,
            "A user with this email already exists",
        )
    }

    pub fn user_not_found() -> Self {
        Self::new(AuthErrorCode::UserNotFound, "User not found")
    }

    pub fn invalid_token() -> Self {
        Self::new(AuthErrorCode::InvalidToken, INVALID_TOKEN_MESSAGE)
    }

    pub fn token_expired() -> Self {
        Self::new(AuthErrorCode::TokenExpired, INVALID_TOKEN_MESSAGE)
    }

    pub fn token_not_found() -> Self {
        Self::new(AuthErrorCode::TokenNotFound, "Token not found")
    }

    pub fn passwords_do_not_match() -> Self {
        Self::new(AuthErrorCode::PasswordsDoNotMatch, "Passwords do not match")
    }

    pub fn not_authenticated() -> Self {
        Self::new(
            AuthErrorCode::NotAuthenticated,
            "There is no authenticated user in the session",
        )
    }

    pub fn send_password_reset_email() -> Self {
        Self::new(AuthErrorCode::SendPasswordResetEmail, SEND_EMAIL_MESSAGE)
    }

    pub fn send_email_verification_email() -> Self {
        Self::new(AuthErrorCode::SendEmailVerificationEmail, SEND_EMAIL_MESSAGE)
    }

    pub fn is(&self, code: &AuthErrorCode) -> bool {
        &self.code == code
    }
}

/// Returns the first field whose value is missing or blank, in the order given.
pub fn require_fields(fields: &[(&'static str, Option<&str>)]) -> Result<(), AuthError> {
    match fields
        .iter()
        .find(|(_, value)| value.is_none_or(|value| value.trim().is_empty()))
    {
        Some((field, _)) => Err(AuthError::required(field)),
        None => Ok(()),
    }
}
