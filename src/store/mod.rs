//! Record Store Port
//!
//! The medicine collection lives in an external document store. Handlers and
//! the repository only ever talk to it through [`MedicineStore`], so the
//! MongoDB adapter can be swapped for the in-memory one in tests or for the
//! detached stand-in when the service starts without a database.

pub mod detached;
pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::medicine::models::{Medicine, MedicineChanges, NewMedicine};

pub use detached::DetachedStore;
pub use memory::InMemoryMedicineStore;
pub use mongo::MongoMedicineStore;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The service is running without a store connection.
    #[error("record store is not connected")]
    Unavailable,

    /// The store could not be reached.
    #[error("record store connection failed: {message}")]
    Connection { message: String },

    /// A query or write was rejected by the store.
    #[error("record store operation failed: {message}")]
    Query { message: String },

    /// A stored document could not be mapped onto a medicine.
    #[error("stored medicine document is invalid: {message}")]
    Corrupt { message: String },
}

/// Where the store lives, as reported by the diagnostics endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreInfo {
    pub host: String,
    pub database: String,
}

/// Outcome of a conditional stock decrement.
#[derive(Debug, Clone, PartialEq)]
pub enum Deduction {
    /// Stock was decremented; carries the updated record.
    Applied(Medicine),
    /// Stock was left untouched because it is lower than requested.
    Insufficient(Medicine),
    /// No medicine with that id exists.
    Missing,
}

/// Data-access port for the medicine collection.
///
/// Every method is a single round-trip to the store, except
/// [`MedicineStore::deduct_stock`] which may issue one extra lookup to tell a
/// missing record apart from insufficient stock. Ids that the backend cannot
/// parse behave like unknown ids.
#[async_trait]
pub trait MedicineStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<Medicine>>;

    async fn find(&self, id: &str) -> StoreResult<Option<Medicine>>;

    async fn insert(&self, medicine: NewMedicine) -> StoreResult<Medicine>;

    /// Insert a batch, returning how many records were written.
    async fn insert_many(&self, medicines: Vec<NewMedicine>) -> StoreResult<usize>;

    /// Apply `changes` to the record, returning the updated record or `None`
    /// when the id is unknown.
    async fn update(&self, id: &str, changes: MedicineChanges) -> StoreResult<Option<Medicine>>;

    /// Remove the record; `false` when the id is unknown.
    async fn delete(&self, id: &str) -> StoreResult<bool>;

    async fn count(&self) -> StoreResult<u64>;

    /// Atomically decrement stock by `quantity` only if at least that much
    /// is on hand.
    async fn deduct_stock(&self, id: &str, quantity: u32) -> StoreResult<Deduction>;

    /// Whether the store connection is live.
    async fn ping(&self) -> bool;

    fn info(&self) -> StoreInfo;
}
