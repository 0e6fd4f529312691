//! Bill processing
//!
//! Lines are priced and deducted one after another. A failure on a line
//! stops processing but leaves the earlier lines' deductions in place; there
//! is no rollback.

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use super::error::{MedicineError, MedicineResult, ValidationError};
use super::helpers::{line_total, parse_requested_quantity, round_currency};
use super::models::{Bill, BillLine, BillRequest};
use super::repository::MedicineRepository;

/// Prices every requested line against current stock and deducts it.
pub async fn process_bill(
    repository: &MedicineRepository,
    request: BillRequest,
) -> MedicineResult<Bill> {
    if request.items.is_empty() {
        return Err(ValidationError::EmptyBill.into());
    }

    // Reject malformed lines before anything is deducted.
    let lines = request
        .items
        .iter()
        .map(|line| {
            parse_requested_quantity(&line.requested_quantity)
                .map(|quantity| (line.medicine_id.trim(), quantity))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut items = Vec::with_capacity(lines.len());
    let mut running_total = 0.0_f64;
    for (index, (medicine_id, requested)) in lines.into_iter().enumerate() {
        let medicine = repository.find(medicine_id).await?;
        if requested > medicine.quantity {
            warn!(
                line = index + 1,
                committed = items.len(),
                medicine = %medicine.name,
                available = medicine.quantity,
                requested,
                "bill stopped on insufficient stock"
            );
            return Err(MedicineError::InsufficientStock {
                name: medicine.name,
                available: medicine.quantity,
                requested,
            });
        }

        // Records stored before the price cap existed may still overflow.
        let amount = line_total(medicine.price, requested);
        if !amount.is_finite() || !(running_total + amount).is_finite() {
            return Err(ValidationError::TotalOutOfRange {
                name: medicine.name,
            }
            .into());
        }

        // The store re-checks stock, so a concurrent bill cannot oversell.
        let updated = repository.deduct_stock(medicine_id, requested).await?;
        running_total += amount;
        items.push(BillLine {
            medicine_id: updated.id,
            name: updated.name,
            company: updated.company,
            price: medicine.price,
            quantity: requested,
            line_total: amount,
            remaining_stock: updated.quantity,
        });
    }

    let total_amount = round_currency(running_total);
    let total_quantity: u64 = items.iter().map(|line| u64::from(line.quantity)).sum();

    Ok(Bill {
        bill_number: Uuid::new_v4().simple().to_string(),
        generated_at: Utc::now(),
        items,
        total_quantity,
        total_amount,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::medicine::models::{BillLineInput, Medicine, MedicineInput, NewMedicine, NumericInput};
    use crate::store::{InMemoryMedicineStore, MedicineStore};

    async fn stocked(repo: &MedicineRepository, name: &str, price: f64, quantity: f64) -> Medicine {
        repo.create(MedicineInput {
            name: Some(name.to_string()),
            company: Some("Sun Pharma".to_string()),
            price: Some(NumericInput::Number(price)),
            quantity: Some(NumericInput::Number(quantity)),
            expiry_date: Some("2026-01-31".to_string()),
        })
        .await
        .unwrap()
    }

    fn line(id: &str, quantity: f64) -> BillLineInput {
        BillLineInput {
            medicine_id: id.to_string(),
            requested_quantity: NumericInput::Number(quantity),
        }
    }

    fn repository() -> MedicineRepository {
        MedicineRepository::new(Arc::new(InMemoryMedicineStore::new()))
    }

    #[tokio::test]
    async fn valid_line_is_priced_and_deducted() {
        let repo = repository();
        let paracetamol = stocked(&repo, "Paracetamol 500mg", 5.50, 150.0).await;

        let bill = process_bill(
            &repo,
            BillRequest {
                items: vec![line(&paracetamol.id, 3.0)],
            },
        )
        .await
        .unwrap();

        assert_eq!(bill.items.len(), 1);
        assert_eq!(bill.items[0].line_total, 16.50);
        assert_eq!(bill.items[0].remaining_stock, 147);
        assert_eq!(bill.total_amount, 16.50);
        assert_eq!(bill.total_quantity, 3);
        assert_eq!(repo.find(&paracetamol.id).await.unwrap().quantity, 147);
    }

    #[tokio::test]
    async fn totals_accumulate_across_lines() {
        let repo = repository();
        let a = stocked(&repo, "Cetirizine 10mg", 8.75, 80.0).await;
        let b = stocked(&repo, "Amoxicillin 500mg", 45.00, 40.0).await;

        let bill = process_bill(
            &repo,
            BillRequest {
                items: vec![line(&a.id, 2.0), line(&b.id, 1.0)],
            },
        )
        .await
        .unwrap();

        assert_eq!(bill.total_amount, 62.50);
        assert_eq!(bill.total_quantity, 3);
    }

    #[tokio::test]
    async fn insufficient_stock_leaves_the_line_untouched() {
        let repo = repository();
        let aspirin = stocked(&repo, "Aspirin 75mg", 12.99, 5.0).await;

        let err = process_bill(
            &repo,
            BillRequest {
                items: vec![line(&aspirin.id, 6.0)],
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            MedicineError::InsufficientStock { available: 5, requested: 6, .. }
        ));
        assert_eq!(repo.find(&aspirin.id).await.unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn earlier_lines_stay_committed_after_a_failure() {
        let repo = repository();
        let first = stocked(&repo, "Vitamin C 1000mg", 25.50, 120.0).await;
        let second = stocked(&repo, "Aspirin 75mg", 12.99, 5.0).await;

        let result = process_bill(
            &repo,
            BillRequest {
                items: vec![line(&first.id, 10.0), line(&second.id, 50.0)],
            },
        )
        .await;

        assert!(matches!(result, Err(MedicineError::InsufficientStock { .. })));
        assert_eq!(repo.find(&first.id).await.unwrap().quantity, 110);
        assert_eq!(repo.find(&second.id).await.unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn malformed_requests_deduct_nothing() {
        let repo = repository();
        let medicine = stocked(&repo, "Paracetamol 500mg", 5.50, 10.0).await;

        assert!(matches!(
            process_bill(&repo, BillRequest::default()).await,
            Err(MedicineError::Validation(ValidationError::EmptyBill))
        ));
        assert!(matches!(
            process_bill(
                &repo,
                BillRequest {
                    items: vec![line(&medicine.id, 1.0), line(&medicine.id, 0.0)],
                },
            )
            .await,
            Err(MedicineError::Validation(ValidationError::MustBePositive { .. }))
        ));
        assert!(matches!(
            process_bill(
                &repo,
                BillRequest {
                    items: vec![line("unknown", 1.0)],
                },
            )
            .await,
            Err(MedicineError::NotFound { .. })
        ));
        assert_eq!(repo.find(&medicine.id).await.unwrap().quantity, 10);
    }

    #[tokio::test]
    async fn total_quantity_holds_stock_beyond_u32() {
        let repo = repository();
        let a = stocked(&repo, "Saline 10ml", 0.10, 4_000_000_000.0).await;
        let b = stocked(&repo, "Gauze Swab", 0.05, 4_000_000_000.0).await;

        let bill = process_bill(
            &repo,
            BillRequest {
                items: vec![line(&a.id, 3_000_000_000.0), line(&b.id, 3_000_000_000.0)],
            },
        )
        .await
        .unwrap();

        assert_eq!(bill.total_quantity, 6_000_000_000);
        assert_eq!(bill.total_amount, 450_000_000.0);
        assert_eq!(repo.find(&a.id).await.unwrap().quantity, 1_000_000_000);
    }

    #[tokio::test]
    async fn unrepresentable_total_is_rejected_before_deducting() {
        let store = Arc::new(InMemoryMedicineStore::new());
        let legacy = store
            .insert(NewMedicine {
                name: "Imported Record".to_string(),
                company: "Legacy".to_string(),
                price: 1e307,
                quantity: 100,
                expiry_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            })
            .await
            .unwrap();
        let repo = MedicineRepository::new(store);

        let err = process_bill(
            &repo,
            BillRequest {
                items: vec![line(&legacy.id, 50.0)],
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            MedicineError::Validation(ValidationError::TotalOutOfRange { .. })
        ));
        assert_eq!(repo.find(&legacy.id).await.unwrap().quantity, 100);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_bills_never_oversell() {
        let repo = repository();
        let medicine = stocked(&repo, "Amoxicillin 500mg", 45.00, 10.0).await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                let id = medicine.id.clone();
                tokio::spawn(async move {
                    process_bill(
                        &repo,
                        BillRequest {
                            items: vec![line(&id, 3.0)],
                        },
                    )
                    .await
                })
            })
            .collect();

        let mut succeeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(err) => assert!(matches!(err, MedicineError::InsufficientStock { .. })),
            }
        }

        assert_eq!(succeeded, 3);
        assert_eq!(repo.find(&medicine.id).await.unwrap().quantity, 1);
    }
}
