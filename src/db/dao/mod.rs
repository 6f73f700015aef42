pub mod base;
pub mod base_traits;
mod context;
pub mod error;
pub mod role_dao;
pub mod session_dao;
pub mod user_dao;
pub mod user_role_dao;
pub mod verification_token_dao;

pub use base::{DaoBase, PaginatedResponse};
pub use base_traits::{HasCreatedAtColumn, HasIdActiveModel, TimestampedActiveModel};
pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use role_dao::RoleDao;
pub use session_dao::SessionDao;
pub use user_dao::UserDao;
pub use user_role_dao::UserRoleDao;
pub use verification_token_dao::VerificationTokenDao;
