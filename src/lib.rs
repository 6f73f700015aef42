pub mod auth;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod logging;
pub mod mail;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
pub mod toast;

#[cfg(test)]
pub(crate) mod test_helpers;
