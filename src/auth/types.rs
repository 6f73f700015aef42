use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

/// Type-level role requirement used by route guards.
pub trait RequiredRole {
    fn required() -> Role;
}

pub struct AdminRole;

impl RequiredRole for AdminRole {
    fn required() -> Role {
        Role::Admin
    }
}

/// The user as stored in the session. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub email_verified: bool,
    pub roles: Vec<String>,
}

impl SessionUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|held| held == role)
    }

    pub fn has_all_roles<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().all(|role| self.has_role(role.as_ref()))
    }

    pub fn has_some_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().any(|role| self.has_role(role.as_ref()))
    }
}

pub fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name.trim(), last_name.trim())
        .trim()
        .to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordForm {
    pub token: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChangePassword {
    pub user_id: Uuid,
    pub current_password: String,
    pub new_password: String,
}

/// A registration that passed validation, ready to persist.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UserQuery {
    pub page: u64,
    pub per_page: u64,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationKind {
    PasswordReset,
    EmailVerification,
}

impl VerificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VerificationKind::PasswordReset => "password_reset",
            VerificationKind::EmailVerification => "email_verification",
        }
    }
}

impl TryFrom<&str> for VerificationKind {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "password_reset" => Ok(VerificationKind::PasswordReset),
            "email_verification" => Ok(VerificationKind::EmailVerification),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    pub token: String,
    pub identifier: String,
    pub kind: VerificationKind,
    pub expires_at: DateTime<FixedOffset>,
}

impl TokenData {
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now().fixed_offset()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{AdminRole, RequiredRole, Role, SessionUser, VerificationKind, full_name};

    fn user(roles: &[&str]) -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            full_name: "Ada Lovelace".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            avatar: None,
            email_verified: false,
            roles: roles.iter().map(|role| role.to_string()).collect(),
        }
    }

    #[test]
    fn admin_guard_requires_admin_role() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(AdminRole::required(), Role::Admin);
    }

    #[test]
    fn role_checks_cover_all_and_some() {
        let editor = user(&["user", "editor"]);

        assert!(editor.has_role("editor"));
        assert!(editor.has_all_roles(&["user", "editor"]));
        assert!(!editor.has_all_roles(&["user", "admin"]));
        assert!(editor.has_some_role(&["admin", "editor"]));
        assert!(!editor.has_some_role(&["admin"]));
    }

    #[test]
    fn session_user_serializes_without_secrets() {
        let json = serde_json::to_value(user(&["user"])).expect("user should serialize");

        assert_eq!(json["fullName"], "Ada Lovelace");
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn full_name_joins_trimmed_parts() {
        assert_eq!(full_name(" Ada ", "Lovelace "), "Ada Lovelace");
        assert_eq!(full_name("Ada", ""), "Ada");
    }

    #[test]
    fn verification_kind_parses_stored_value() {
        assert_eq!(
            VerificationKind::try_from(VerificationKind::EmailVerification.as_str()),
            Ok(VerificationKind::EmailVerification)
        );
    }
}
