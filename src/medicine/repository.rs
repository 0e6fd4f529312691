//! Medicine Repository
//!
//! Maps application calls onto single round-trips to the record store and
//! validates client input on the way in. Nothing is cached between calls.

use std::sync::Arc;

use tracing::{debug, info};

use super::error::{MedicineError, MedicineResult};
use super::helpers::{sample_medicines, validate_changes, validate_new_medicine};
use super::models::{Medicine, MedicineInput};
use crate::store::{Deduction, MedicineStore, StoreInfo};

/// What happened when sample data seeding ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The store was empty and this many samples were inserted.
    Seeded(usize),
    /// The store already held this many medicines.
    AlreadyPopulated(u64),
}

#[derive(Clone)]
pub struct MedicineRepository {
    store: Arc<dyn MedicineStore>,
}

impl MedicineRepository {
    pub fn new(store: Arc<dyn MedicineStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> MedicineResult<Vec<Medicine>> {
        Ok(self.store.list().await?)
    }

    pub async fn find(&self, id: &str) -> MedicineResult<Medicine> {
        self.store.find(id).await?.ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, input: MedicineInput) -> MedicineResult<Medicine> {
        let medicine = validate_new_medicine(input)?;
        Ok(self.store.insert(medicine).await?)
    }

    pub async fn update(&self, id: &str, input: MedicineInput) -> MedicineResult<Medicine> {
        let changes = validate_changes(input)?;
        self.store
            .update(id, changes)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn delete(&self, id: &str) -> MedicineResult<()> {
        if self.store.delete(id).await? {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }

    pub async fn count(&self) -> MedicineResult<u64> {
        Ok(self.store.count().await?)
    }

    /// Removes `quantity` units from stock, refusing to go below zero.
    pub async fn deduct_stock(&self, id: &str, quantity: u32) -> MedicineResult<Medicine> {
        match self.store.deduct_stock(id, quantity).await? {
            Deduction::Applied(medicine) => {
                debug!(id, quantity, remaining = medicine.quantity, "stock deducted");
                Ok(medicine)
            }
            Deduction::Insufficient(medicine) => Err(MedicineError::InsufficientStock {
                name: medicine.name,
                available: medicine.quantity,
                requested: quantity,
            }),
            Deduction::Missing => Err(not_found(id)),
        }
    }

    /// Inserts the sample catalogue when the store holds no medicines.
    pub async fn seed_samples(&self) -> MedicineResult<SeedOutcome> {
        let count = self.store.count().await?;
        if count > 0 {
            return Ok(SeedOutcome::AlreadyPopulated(count));
        }
        let inserted = self.store.insert_many(sample_medicines()).await?;
        info!(inserted, "sample medicines created");
        Ok(SeedOutcome::Seeded(inserted))
    }

    /// Whether the store connection is live.
    pub async fn ping(&self) -> bool {
        self.store.ping().await
    }

    pub fn store_info(&self) -> StoreInfo {
        self.store.info()
    }
}

fn not_found(id: &str) -> MedicineError {
    MedicineError::NotFound { id: id.to_string() }
}
