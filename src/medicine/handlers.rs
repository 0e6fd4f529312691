//! REST API handlers for medicine records and billing

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::info;

use super::{billing, helpers::format_bill_summary, models::*};
use crate::{error::ApiError, extract::JsonOrForm, state::SharedState};

/// Creates routes for medicine operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/medicines", get(list_medicines).post(create_medicine))
        .route("/api/medicines/bill/process", post(process_bill))
        .route(
            "/api/medicines/:id",
            get(get_medicine)
                .put(update_medicine)
                .delete(delete_medicine),
        )
}

/// Endpoint: GET /api/medicines
async fn list_medicines(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    let medicines = state.medicines.list().await?;
    Ok(Json(json!({
        "success": true,
        "count": medicines.len(),
        "data": medicines,
    })))
}

/// Endpoint: GET /api/medicines/:id
async fn get_medicine(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let medicine = state.medicines.find(&id).await?;
    Ok(Json(json!({ "success": true, "data": medicine })))
}

/// Endpoint: POST /api/medicines
async fn create_medicine(
    State(state): State<SharedState>,
    JsonOrForm(input): JsonOrForm<MedicineInput>,
) -> Result<impl IntoResponse, ApiError> {
    let medicine = state.medicines.create(input).await?;
    info!(id = %medicine.id, name = %medicine.name, "medicine created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Medicine added successfully",
            "data": medicine,
        })),
    ))
}

/// Endpoint: PUT /api/medicines/:id
async fn update_medicine(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    JsonOrForm(input): JsonOrForm<MedicineInput>,
) -> Result<Json<Value>, ApiError> {
    let medicine = state.medicines.update(&id, input).await?;
    info!(id = %medicine.id, "medicine updated");

    Ok(Json(json!({
        "success": true,
        "message": "Medicine updated successfully",
        "data": medicine,
    })))
}

/// Endpoint: DELETE /api/medicines/:id
async fn delete_medicine(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.medicines.delete(&id).await?;
    info!(id = %id, "medicine deleted");

    Ok(Json(json!({
        "success": true,
        "message": "Medicine deleted successfully",
    })))
}

/// Endpoint: POST /api/medicines/bill/process
/// Prices each line against stock and deducts it. Lines before a failing
/// line stay deducted. JSON only: a flat form cannot carry the line list.
async fn process_bill(
    State(state): State<SharedState>,
    body: Result<Json<BillRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = body?;
    let bill = billing::process_bill(&state.medicines, request).await?;
    info!(
        bill_number = %bill.bill_number,
        total = bill.total_amount,
        items = %format_bill_summary(&bill.items),
        "bill processed"
    );

    Ok(Json(json!({
        "success": true,
        "message": "Bill processed successfully",
        "bill": bill,
    })))
}
