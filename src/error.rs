use thiserror::Error;

use crate::{auth::AuthError, db::dao::DaoLayerError, response::Redirect};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
    /// Expected outcome of an auth operation, reported back to the caller.
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// A guard short-circuited the request.
    #[error("redirect to {}", .0.location())]
    Redirect(Redirect),
    /// The library was wired up incorrectly. Never the client's fault.
    #[error("{0}")]
    Misconfigured(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn misconfigured(message: impl Into<String>) -> Self {
        Self::Misconfigured(format!("BreezeAuth: {}", message.into()))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::Conflict(message)
            | Self::Internal(message)
            | Self::Misconfigured(message) => message.as_str(),
            Self::Auth(err) => err.message.as_str(),
            Self::Redirect(redirect) => redirect.location(),
        }
    }

    /// The domain error carried by this value, if any.
    pub fn auth(&self) -> Option<&AuthError> {
        match self {
            Self::Auth(err) => Some(err),
            _ => None,
        }
    }
}

impl From<Redirect> for AppError {
    fn from(redirect: Redirect) -> Self {
        Self::Redirect(redirect)
    }
}

impl From<DaoLayerError> for AppError {
    fn from(err: DaoLayerError) -> Self {
        match err {
            DaoLayerError::NotFound { .. } => AppError::not_found(err.to_string()),
            DaoLayerError::InvalidPagination { .. } => AppError::bad_request(err.to_string()),
            DaoLayerError::Db(_) => AppError::internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::DbErr;
    use uuid::Uuid;

    use crate::{auth::AuthError, db::dao::DaoLayerError, response::Redirect};

    use super::AppError;

    #[test]
    fn misconfigured_messages_are_prefixed() {
        let err = AppError::misconfigured("No credentials provider found in the configuration");

        assert_eq!(
            err.message(),
            "BreezeAuth: No credentials provider found in the configuration"
        );
    }

    #[test]
    fn dao_errors_map_to_http_flavoured_variants() {
        let id = Uuid::new_v4();
        let not_found = AppError::from(DaoLayerError::NotFound { entity: "user", id });
        let pagination = AppError::from(DaoLayerError::InvalidPagination {
            page: 0,
            page_size: 10,
        });
        let db = AppError::from(DaoLayerError::Db(DbErr::Custom("boom".to_string())));

        assert!(matches!(not_found, AppError::NotFound(_)));
        assert!(matches!(pagination, AppError::BadRequest(_)));
        assert!(matches!(db, AppError::Internal(_)));
    }

    #[test]
    fn auth_errors_are_exposed_through_accessor() {
        let err = AppError::from(AuthError::invalid_email());

        assert_eq!(err.auth().map(|e| e.code.to_string()), Some("invalid_email".to_string()));
        assert!(AppError::from(Redirect::to("/")).auth().is_none());
    }
}
