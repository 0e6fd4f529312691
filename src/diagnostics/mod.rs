//! Health and store diagnostics endpoints

pub mod handlers;

pub use handlers::routes;

/// Server name reported by the health endpoint
pub const SERVER_NAME: &str = "Pharmacy Management System";
