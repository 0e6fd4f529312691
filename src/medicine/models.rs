//! Medicine Domain Models
//!
//! Records, the inputs accepted by the HTTP layer, and the bill produced by
//! the billing endpoint.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Medicine Records
// =============================================================================

/// A medicine as stored in the record store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    /// Store-assigned identifier
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,

    /// Manufacturer
    pub company: String,

    /// Unit price
    pub price: f64,

    /// Stock on hand
    pub quantity: u32,

    pub expiry_date: NaiveDate,
}

/// A validated medicine awaiting insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMedicine {
    pub name: String,
    pub company: String,
    pub price: f64,
    pub quantity: u32,
    pub expiry_date: NaiveDate,
}

impl NewMedicine {
    pub fn into_medicine(self, id: String) -> Medicine {
        Medicine {
            id,
            name: self.name,
            company: self.company,
            price: self.price,
            quantity: self.quantity,
            expiry_date: self.expiry_date,
        }
    }
}

/// Validated partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MedicineChanges {
    pub name: Option<String>,
    pub company: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<u32>,
    pub expiry_date: Option<NaiveDate>,
}

impl MedicineChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.company.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
            && self.expiry_date.is_none()
    }

    pub fn apply_to(self, medicine: &mut Medicine) {
        if let Some(name) = self.name {
            medicine.name = name;
        }
        if let Some(company) = self.company {
            medicine.company = company;
        }
        if let Some(price) = self.price {
            medicine.price = price;
        }
        if let Some(quantity) = self.quantity {
            medicine.quantity = quantity;
        }
        if let Some(expiry_date) = self.expiry_date {
            medicine.expiry_date = expiry_date;
        }
    }
}

// =============================================================================
// Request Inputs
// =============================================================================

/// A number as submitted by a client: forms post numeric strings, scripts
/// post JSON numbers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

/// Body of the create and update endpoints. Every field is optional here so
/// that missing fields surface as validation errors naming the field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineInput {
    pub name: Option<String>,
    pub company: Option<String>,
    pub price: Option<NumericInput>,
    pub quantity: Option<NumericInput>,
    pub expiry_date: Option<String>,
}

/// Body of `POST /api/medicines/bill/process`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillRequest {
    #[serde(default)]
    pub items: Vec<BillLineInput>,
}

/// One requested line of a bill.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillLineInput {
    #[serde(alias = "_id", alias = "id")]
    pub medicine_id: String,

    #[serde(alias = "quantity")]
    pub requested_quantity: NumericInput,
}

// =============================================================================
// Bill Output
// =============================================================================

/// A priced and committed bill line.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillLine {
    pub medicine_id: String,
    pub name: String,
    pub company: String,

    /// Unit price at the time of billing
    pub price: f64,

    /// Units sold
    pub quantity: u32,

    /// `price × quantity`, rounded to cents
    pub line_total: f64,

    /// Stock left after this line was deducted
    pub remaining_stock: u32,
}

/// Itemised bill with its grand total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub bill_number: String,
    pub generated_at: DateTime<Utc>,
    pub items: Vec<BillLine>,

    /// Units across all lines
    pub total_quantity: u64,

    pub total_amount: f64,
}
