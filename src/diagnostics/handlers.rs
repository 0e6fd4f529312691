//! Health and store diagnostic route handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tracing::warn;

use super::SERVER_NAME;

/// Driver connection state reported by `/api/test-db`; 1 means connected.
const CONNECTED: u8 = 1;
use crate::{error::error_body, state::SharedState};

/// Creates routes for diagnostics
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/test-db", get(test_db))
}

/// Endpoint: GET /api/health
/// Reports "connected" only if the store answers a ping.
async fn health(State(state): State<SharedState>) -> Json<Value> {
    let database = if state.medicines.ping().await {
        "connected"
    } else {
        "disconnected"
    };

    Json(json!({
        "status": "healthy",
        "database": database,
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "server": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Endpoint: GET /api/test-db
/// Counts documents to prove a full round-trip. Failures always carry the
/// store error, since diagnosing it is the point of this endpoint.
async fn test_db(State(state): State<SharedState>) -> Response {
    let info = state.medicines.store_info();

    match state.medicines.count().await {
        Ok(count) => Json(json!({
            "success": true,
            "message": "Database connection successful",
            "connectionStatus": CONNECTED,
            "medicineCount": count,
            "databaseName": info.database,
            "host": info.host,
        }))
        .into_response(),
        Err(err) => {
            warn!(error = %err, host = %info.host, "database test failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(error_body("Database test failed", Some(&err.to_string()))),
            )
                .into_response()
        }
    }
}
