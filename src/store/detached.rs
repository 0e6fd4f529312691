//! Stand-in store used when the service starts without a database.
//!
//! Pages and the health endpoint keep working; every data operation fails
//! with [`StoreError::Unavailable`].

use async_trait::async_trait;

use super::{Deduction, MedicineStore, StoreError, StoreInfo, StoreResult};
use crate::medicine::models::{Medicine, MedicineChanges, NewMedicine};

pub struct DetachedStore {
    info: StoreInfo,
}

impl DetachedStore {
    pub fn new(info: StoreInfo) -> Self {
        Self { info }
    }
}

#[async_trait]
impl MedicineStore for DetachedStore {
    async fn list(&self) -> StoreResult<Vec<Medicine>> {
        Err(StoreError::Unavailable)
    }

    async fn find(&self, _id: &str) -> StoreResult<Option<Medicine>> {
        Err(StoreError::Unavailable)
    }

    async fn insert(&self, _medicine: NewMedicine) -> StoreResult<Medicine> {
        Err(StoreError::Unavailable)
    }

    async fn insert_many(&self, _medicines: Vec<NewMedicine>) -> StoreResult<usize> {
        Err(StoreError::Unavailable)
    }

    async fn update(&self, _id: &str, _changes: MedicineChanges) -> StoreResult<Option<Medicine>> {
        Err(StoreError::Unavailable)
    }

    async fn delete(&self, _id: &str) -> StoreResult<bool> {
        Err(StoreError::Unavailable)
    }

    async fn count(&self) -> StoreResult<u64> {
        Err(StoreError::Unavailable)
    }

    async fn deduct_stock(&self, _id: &str, _quantity: u32) -> StoreResult<Deduction> {
        Err(StoreError::Unavailable)
    }

    async fn ping(&self) -> bool {
        false
    }

    fn info(&self) -> StoreInfo {
        self.info.clone()
    }
}
