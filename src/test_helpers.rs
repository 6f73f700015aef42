use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    auth::{SessionUser, VerificationKind, full_name},
    db::entities::{session, user, verification_token},
};

pub fn ts() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .and_then(|offset| offset.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single())
        .expect("fixture timestamp should be valid")
}

pub fn user_model(id: Uuid, email: &str, password_hash: &str) -> user::Model {
    user::Model {
        id,
        created_at: ts(),
        updated_at: ts(),
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        full_name: full_name("Ada", "Lovelace"),
        avatar: None,
        email_verified: false,
    }
}

pub fn token_model(
    token: &str,
    identifier: &str,
    expires_at: DateTime<FixedOffset>,
) -> verification_token::Model {
    verification_token::Model {
        id: Uuid::new_v4(),
        created_at: ts(),
        updated_at: ts(),
        token: token.to_string(),
        identifier: identifier.to_string(),
        kind: VerificationKind::PasswordReset.as_str().to_string(),
        expires_at,
    }
}

pub fn session_model(
    id: Uuid,
    user_id: Option<Uuid>,
    data: &str,
    expires_at: DateTime<Utc>,
) -> session::Model {
    session::Model {
        id,
        created_at: ts(),
        updated_at: ts(),
        user_id,
        data: data.to_string(),
        expires_at: expires_at.fixed_offset(),
    }
}

pub fn session_user(email: &str, roles: &[&str]) -> SessionUser {
    SessionUser {
        id: Uuid::new_v4(),
        email: email.to_string(),
        full_name: full_name("Ada", "Lovelace"),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        avatar: None,
        email_verified: false,
        roles: roles.iter().map(|role| role.to_string()).collect(),
    }
}
