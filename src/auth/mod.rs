//! Login Module
//!
//! A stateless credential check against configured values. There is no
//! session store and the returned token is a fixed string.

pub mod handlers;
pub mod models;

pub use handlers::routes;

use crate::config::AuthConfig;

/// True when both values match the configured credentials.
pub fn verify_credentials(auth: &AuthConfig, username: Option<&str>, password: Option<&str>) -> bool {
    matches!(
        (username, password),
        (Some(user), Some(pass)) if user == auth.username && pass == auth.password
    )
}
