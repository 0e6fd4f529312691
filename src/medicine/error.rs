//! Medicine Domain Errors
//!
//! `ValidationError` covers bad client input, `MedicineError` covers every
//! failure a repository or billing call can produce. The HTTP layer maps the
//! latter onto status codes in `crate::error`.

use thiserror::Error;

use crate::store::StoreError;

/// Input validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be a valid number")]
    InvalidNumber { field: String },

    #[error("{field} cannot be negative")]
    Negative { field: String },

    #[error("{field} must be a whole number")]
    NotAnInteger { field: String },

    #[error("{field} must be at least 1")]
    MustBePositive { field: String },

    #[error("{field} cannot exceed {max}")]
    TooLarge { field: String, max: u32 },

    #[error("{field} must be a date (YYYY-MM-DD), got '{value}'")]
    InvalidDate { field: String, value: String },

    #[error("Bill must contain at least one item")]
    EmptyBill,

    /// Line or grand total not representable as an amount.
    #[error("Bill total for {name} is out of range")]
    TotalOutOfRange { name: String },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        Self::Required {
            field: field.to_string(),
        }
    }
}

/// Failures of medicine operations.
#[derive(Debug, Error)]
pub enum MedicineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Unknown or malformed id.
    #[error("Medicine not found: {id}")]
    NotFound { id: String },

    /// Requested more units than are on hand.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: u32,
        requested: u32,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type MedicineResult<T> = Result<T, MedicineError>;
