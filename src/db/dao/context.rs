use sea_orm::DatabaseConnection;

use super::{DaoBase, RoleDao, SessionDao, UserDao, UserRoleDao, VerificationTokenDao};

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn user(&self) -> UserDao {
        DaoBase::new(&self.db)
    }

    pub fn role(&self) -> RoleDao {
        DaoBase::new(&self.db)
    }

    pub fn user_role(&self) -> UserRoleDao {
        DaoBase::new(&self.db)
    }

    pub fn verification_token(&self) -> VerificationTokenDao {
        DaoBase::new(&self.db)
    }

    pub fn session(&self) -> SessionDao {
        DaoBase::new(&self.db)
    }
}
