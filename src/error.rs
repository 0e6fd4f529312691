//! HTTP error mapping
//!
//! Every failure leaves the service as `{"success": false, "message": ...}`.
//! Internal failures carry their detail in an [`ErrorDetail`] response
//! extension; [`reveal_error_detail`] copies it into the body only when the
//! service runs in development mode.

use std::any::Any;

use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;

use crate::medicine::error::MedicineError;
use crate::state::SharedState;
use crate::store::StoreError;

/// Message used for every 500 response.
pub const INTERNAL_MESSAGE: &str = "Internal Server Error";

/// Errors returned by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid fields, malformed JSON
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Route not found")]
    RouteNotFound,

    #[error("{0}")]
    InsufficientStock(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The service started without a store connection.
    #[error("Database is not connected")]
    StoreUnavailable,

    /// Anything unexpected; the message is only shown in development mode.
    #[error("{0}")]
    Internal(String),
}

/// Internal error detail attached to 500 responses.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::InsufficientStock(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Builds the JSON failure envelope.
pub fn error_body(message: &str, detail: Option<&str>) -> Value {
    let mut body = json!({
        "success": false,
        "message": message,
    });
    if let Some(detail) = detail {
        body["error"] = json!(detail);
    }
    body
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ApiError::Internal(detail) => {
                error!(error = %detail, "request failed");
                let mut response = (status, Json(error_body(INTERNAL_MESSAGE, None))).into_response();
                response.extensions_mut().insert(ErrorDetail(detail));
                response
            }
            other => (status, Json(error_body(&other.to_string(), None))).into_response(),
        }
    }
}

impl From<MedicineError> for ApiError {
    fn from(err: MedicineError) -> Self {
        match err {
            MedicineError::Validation(validation) => ApiError::BadRequest(validation.to_string()),
            MedicineError::NotFound { .. } => ApiError::NotFound("Medicine not found".to_string()),
            stock @ MedicineError::InsufficientStock { .. } => {
                ApiError::InsufficientStock(stock.to_string())
            }
            MedicineError::Store(StoreError::Unavailable) => ApiError::StoreUnavailable,
            MedicineError::Store(store) => ApiError::Internal(store.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Fallback for requests no route or static file matched.
pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// Response middleware: copies [`ErrorDetail`] into the body in development
/// mode.
pub async fn reveal_error_detail(State(state): State<SharedState>, response: Response) -> Response {
    if !state.config.expose_error_details {
        return response;
    }
    match response.extensions().get::<ErrorDetail>().cloned() {
        Some(ErrorDetail(detail)) => (
            response.status(),
            Json(error_body(INTERNAL_MESSAGE, Some(&detail))),
        )
            .into_response(),
        None => response,
    }
}

/// Builds the panic handler for `CatchPanicLayer`.
pub fn panic_response(
    expose_details: bool,
) -> impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone {
    move |panic| {
        let detail = if let Some(message) = panic.downcast_ref::<String>() {
            message.clone()
        } else if let Some(message) = panic.downcast_ref::<&str>() {
            (*message).to_string()
        } else {
            "handler panicked".to_string()
        };
        error!(panic = %detail, "handler panicked");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(error_body(
                INTERNAL_MESSAGE,
                expose_details.then_some(detail.as_str()),
            )),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medicine::error::ValidationError;

    #[test]
    fn medicine_errors_map_to_statuses() {
        let cases = [
            (
                MedicineError::Validation(ValidationError::EmptyBill),
                StatusCode::BAD_REQUEST,
            ),
            (
                MedicineError::NotFound { id: "x".into() },
                StatusCode::NOT_FOUND,
            ),
            (
                MedicineError::InsufficientStock {
                    name: "Aspirin".into(),
                    available: 1,
                    requested: 2,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                MedicineError::Store(StoreError::Unavailable),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                MedicineError::Store(StoreError::Query {
                    message: "boom".into(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn internal_errors_hide_detail_in_body() {
        let response = ApiError::Internal("socket closed".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = response.extensions().get::<ErrorDetail>().unwrap();
        assert_eq!(detail.0, "socket closed");
    }

    #[test]
    fn error_body_includes_detail_only_when_given() {
        assert_eq!(
            error_body("Route not found", None),
            json!({ "success": false, "message": "Route not found" })
        );
        assert_eq!(error_body("x", Some("why"))["error"], "why");
    }

    #[test]
    fn panic_handler_respects_detail_flag() {
        let hidden = panic_response(false)(Box::new("kaboom"));
        assert_eq!(hidden.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let shown = panic_response(true)(Box::new(String::from("kaboom")));
        assert_eq!(shown.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
