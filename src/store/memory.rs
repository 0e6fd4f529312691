//! In-process medicine store
//!
//! Keeps records in a `DashMap` so concurrent handlers can read and mutate
//! without an external mutex. Used by the test-suite and by the
//! `STORE_BACKEND=memory` development mode.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use super::{Deduction, MedicineStore, StoreInfo, StoreResult};
use crate::medicine::models::{Medicine, MedicineChanges, NewMedicine};

/// A stored record together with its insertion sequence, so `list` keeps
/// creation order like the document store does.
struct Entry {
    seq: u64,
    medicine: Medicine,
}

#[derive(Default)]
pub struct InMemoryMedicineStore {
    medicines: DashMap<String, Entry>,
    next_seq: AtomicU64,
}

impl InMemoryMedicineStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self, new: NewMedicine) -> Medicine {
        let medicine = new.into_medicine(Uuid::new_v4().simple().to_string());
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.medicines.insert(
            medicine.id.clone(),
            Entry {
                seq,
                medicine: medicine.clone(),
            },
        );
        medicine
    }
}

#[async_trait]
impl MedicineStore for InMemoryMedicineStore {
    async fn list(&self) -> StoreResult<Vec<Medicine>> {
        let mut entries: Vec<(u64, Medicine)> = self
            .medicines
            .iter()
            .map(|entry| (entry.seq, entry.medicine.clone()))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        Ok(entries.into_iter().map(|(_, medicine)| medicine).collect())
    }

    async fn find(&self, id: &str) -> StoreResult<Option<Medicine>> {
        Ok(self.medicines.get(id).map(|entry| entry.medicine.clone()))
    }

    async fn insert(&self, medicine: NewMedicine) -> StoreResult<Medicine> {
        Ok(self.store(medicine))
    }

    async fn insert_many(&self, medicines: Vec<NewMedicine>) -> StoreResult<usize> {
        let inserted = medicines.len();
        for medicine in medicines {
            self.store(medicine);
        }
        Ok(inserted)
    }

    async fn update(&self, id: &str, changes: MedicineChanges) -> StoreResult<Option<Medicine>> {
        Ok(self.medicines.get_mut(id).map(|mut entry| {
            changes.apply_to(&mut entry.medicine);
            entry.medicine.clone()
        }))
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        Ok(self.medicines.remove(id).is_some())
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.medicines.len() as u64)
    }

    async fn deduct_stock(&self, id: &str, quantity: u32) -> StoreResult<Deduction> {
        // The shard write lock is held for the check and the decrement.
        let Some(mut entry) = self.medicines.get_mut(id) else {
            return Ok(Deduction::Missing);
        };
        if entry.medicine.quantity < quantity {
            return Ok(Deduction::Insufficient(entry.medicine.clone()));
        }
        entry.medicine.quantity -= quantity;
        Ok(Deduction::Applied(entry.medicine.clone()))
    }

    async fn ping(&self) -> bool {
        true
    }

    fn info(&self) -> StoreInfo {
        StoreInfo {
            host: "in-memory".to_string(),
            database: "memory".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample(name: &str, quantity: u32) -> NewMedicine {
        NewMedicine {
            name: name.to_string(),
            company: "Acme".to_string(),
            price: 2.0,
            quantity,
            expiry_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let store = InMemoryMedicineStore::new();
        store.insert(sample("B", 1)).await.unwrap();
        store.insert(sample("A", 1)).await.unwrap();
        store
            .insert_many(vec![sample("C", 1), sample("D", 1)])
            .await
            .unwrap();

        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["B", "A", "C", "D"]);
        assert_eq!(store.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn deduct_stock_never_goes_negative() {
        let store = InMemoryMedicineStore::new();
        let medicine = store.insert(sample("Aspirin", 5)).await.unwrap();

        match store.deduct_stock(&medicine.id, 6).await.unwrap() {
            Deduction::Insufficient(current) => assert_eq!(current.quantity, 5),
            other => panic!("expected insufficient stock, got {other:?}"),
        }
        match store.deduct_stock(&medicine.id, 5).await.unwrap() {
            Deduction::Applied(updated) => assert_eq!(updated.quantity, 0),
            other => panic!("expected deduction, got {other:?}"),
        }
        assert_eq!(
            store.deduct_stock("missing", 1).await.unwrap(),
            Deduction::Missing
        );
    }

    #[tokio::test]
    async fn update_and_delete_report_unknown_ids() {
        let store = InMemoryMedicineStore::new();
        assert!(store
            .update("nope", MedicineChanges::default())
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete("nope").await.unwrap());
    }
}
