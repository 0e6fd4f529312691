//! Login route handler

use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use tracing::{info, warn};

use super::{models::*, verify_credentials};
use crate::{error::ApiError, extract::JsonOrForm, state::SharedState};

/// Creates routes for login
pub fn routes() -> Router<SharedState> {
    Router::new().route("/api/login", post(login))
}

/// Endpoint: POST /api/login
async fn login(
    State(state): State<SharedState>,
    JsonOrForm(input): JsonOrForm<LoginInput>,
) -> Result<Json<LoginResponse>, ApiError> {
    let auth = &state.config.auth;

    if !verify_credentials(auth, input.username.as_deref(), input.password.as_deref()) {
        warn!(username = input.username.as_deref().unwrap_or(""), "login rejected");
        return Err(ApiError::InvalidCredentials);
    }

    info!(username = %auth.username, "login succeeded");
    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token: auth.token.clone(),
        user: LoginUser {
            username: auth.username.clone(),
            role: "admin".to_string(),
        },
    }))
}
