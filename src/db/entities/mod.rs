#[allow(unused_imports)]
pub mod prelude {
    pub use super::role::Entity as Role;
    pub use super::session::Entity as Session;
    pub use super::user::Entity as User;
    pub use super::user_role::Entity as UserRole;
    pub use super::verification_token::Entity as VerificationToken;
}

pub mod role;
pub mod session;
pub mod user;
pub mod user_role;
pub mod verification_token;
