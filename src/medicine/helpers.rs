//! Medicine Business Logic Helpers
//!
//! Field coercion and validation, currency arithmetic, and the fixed sample
//! catalogue seeded into an empty store.

use chrono::{DateTime, NaiveDate};

use super::error::ValidationError;
use super::models::{BillLine, MedicineChanges, MedicineInput, NewMedicine, NumericInput};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Highest accepted unit price.
pub const MAX_PRICE: u32 = 1_000_000_000;

// =============================================================================
// Field Validators
// =============================================================================

/// Trims a text field and rejects it when missing or blank.
pub fn require_text(field: &str, value: Option<String>) -> ValidationResult<String> {
    let value = value.unwrap_or_default();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(trimmed.to_string())
}

fn parse_number(field: &str, value: &NumericInput) -> ValidationResult<f64> {
    let number = match value {
        NumericInput::Number(number) => *number,
        NumericInput::Text(text) if text.trim().is_empty() => {
            return Err(ValidationError::required(field))
        }
        NumericInput::Text(text) => {
            text.trim()
                .parse::<f64>()
                .map_err(|_| ValidationError::InvalidNumber {
                    field: field.to_string(),
                })?
        }
    };
    if !number.is_finite() {
        return Err(ValidationError::InvalidNumber {
            field: field.to_string(),
        });
    }
    Ok(number)
}

/// Validates a unit price: non-negative and at most [`MAX_PRICE`]. Zero is
/// allowed.
pub fn parse_price(value: &NumericInput) -> ValidationResult<f64> {
    let price = parse_number("price", value)?;
    if price < 0.0 {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }
    if price > f64::from(MAX_PRICE) {
        return Err(ValidationError::TooLarge {
            field: "price".to_string(),
            max: MAX_PRICE,
        });
    }
    Ok(price)
}

fn parse_whole(field: &str, value: &NumericInput) -> ValidationResult<f64> {
    let number = parse_number(field, value)?;
    if number.fract() != 0.0 {
        return Err(ValidationError::NotAnInteger {
            field: field.to_string(),
        });
    }
    if number > f64::from(u32::MAX) {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: u32::MAX,
        });
    }
    Ok(number)
}

/// Validates a stock level: a whole number, zero or more.
pub fn parse_stock_quantity(value: &NumericInput) -> ValidationResult<u32> {
    let number = parse_whole("quantity", value)?;
    if number < 0.0 {
        return Err(ValidationError::Negative {
            field: "quantity".to_string(),
        });
    }
    Ok(number as u32)
}

/// Validates a requested bill quantity: a whole number, one or more.
pub fn parse_requested_quantity(value: &NumericInput) -> ValidationResult<u32> {
    let number = parse_whole("requestedQuantity", value)?;
    if number < 1.0 {
        return Err(ValidationError::MustBePositive {
            field: "requestedQuantity".to_string(),
        });
    }
    Ok(number as u32)
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (its date is kept).
pub fn parse_expiry_date(value: &str) -> ValidationResult<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::required("expiryDate"));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|timestamp| timestamp.date_naive()))
        .map_err(|_| ValidationError::InvalidDate {
            field: "expiryDate".to_string(),
            value: value.to_string(),
        })
}

/// Validates a create request into a [`NewMedicine`]. All fields are
/// required.
pub fn validate_new_medicine(input: MedicineInput) -> ValidationResult<NewMedicine> {
    let name = require_text("name", input.name)?;
    let company = require_text("company", input.company)?;
    let price = input
        .price
        .as_ref()
        .ok_or_else(|| ValidationError::required("price"))
        .and_then(parse_price)?;
    let quantity = input
        .quantity
        .as_ref()
        .ok_or_else(|| ValidationError::required("quantity"))
        .and_then(parse_stock_quantity)?;
    let expiry_date = input
        .expiry_date
        .as_deref()
        .ok_or_else(|| ValidationError::required("expiryDate"))
        .and_then(parse_expiry_date)?;

    Ok(NewMedicine {
        name,
        company,
        price,
        quantity,
        expiry_date,
    })
}

/// Validates an update request; absent fields stay untouched, present ones
/// follow the create rules.
pub fn validate_changes(input: MedicineInput) -> ValidationResult<MedicineChanges> {
    Ok(MedicineChanges {
        name: input
            .name
            .map(|name| require_text("name", Some(name)))
            .transpose()?,
        company: input
            .company
            .map(|company| require_text("company", Some(company)))
            .transpose()?,
        price: input.price.as_ref().map(parse_price).transpose()?,
        quantity: input.quantity.as_ref().map(parse_stock_quantity).transpose()?,
        expiry_date: input
            .expiry_date
            .as_deref()
            .map(parse_expiry_date)
            .transpose()?,
    })
}

// =============================================================================
// Currency
// =============================================================================

/// Rounds an amount to whole cents.
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// `price × quantity`, rounded to cents.
pub fn line_total(price: f64, quantity: u32) -> f64 {
    round_currency(price * f64::from(quantity))
}

/// Produces a one-line summary of a bill for logs.
///
/// Example output: `"3x Paracetamol 500mg, 1x Aspirin 75mg"`.
pub fn format_bill_summary(lines: &[BillLine]) -> String {
    lines
        .iter()
        .map(|line| format!("{}x {}", line.quantity, line.name))
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Sample Data
// =============================================================================

/// The five medicines seeded into an empty store on first start.
pub fn sample_medicines() -> Vec<NewMedicine> {
    [
        ("Paracetamol 500mg", "Cipla Ltd", 5.50, 150, (2025, 12, 31)),
        ("Cetirizine 10mg", "Sun Pharma", 8.75, 80, (2024, 11, 30)),
        ("Aspirin 75mg", "Bayer", 12.99, 5, (2024, 8, 15)),
        ("Amoxicillin 500mg", "GlaxoSmithKline", 45.00, 40, (2024, 9, 30)),
        ("Vitamin C 1000mg", "Dabur", 25.50, 120, (2026, 1, 31)),
    ]
    .into_iter()
    .filter_map(|(name, company, price, quantity, (y, m, d))| {
        Some(NewMedicine {
            name: name.to_string(),
            company: company.to_string(),
            price,
            quantity,
            expiry_date: NaiveDate::from_ymd_opt(y, m, d)?,
        })
    })
    .collect()
}
