//! Medicine Domain Module
//!
//! This module contains the pharmacy inventory and billing logic:
//! - Domain models (Medicine, inputs, bills)
//! - Validation and currency helpers
//! - The repository over the record store
//! - Bill processing
//! - REST API handlers

pub mod billing;
pub mod error;
pub mod handlers;
pub mod helpers;
pub mod models;
pub mod repository;

// Re-export commonly used types for convenience
pub use error::{MedicineError, ValidationError};
pub use handlers::routes;
pub use repository::{MedicineRepository, SeedOutcome};
