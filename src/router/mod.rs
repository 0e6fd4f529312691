//! Routing module for the pharmacy service

pub mod pages;

use std::time::Instant;

use axum::{
    body::Body,
    extract::Request,
    handler::HandlerWithoutStateExt,
    middleware::{self, Next},
    response::Response,
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing::{info, warn};

use crate::error::{panic_response, reveal_error_detail, route_not_found};
use crate::state::SharedState;

/// Creates and configures the application router with all routes and middleware
pub fn create_app_router(state: SharedState) -> Router {
    // Middleware: CORS (Permissive, the pages are served by this same process)
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Static assets from the frontend directory; anything else is a JSON 404
    let static_files = ServeDir::new(&state.config.frontend_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(route_not_found.into_service());

    // Routes
    Router::new()
        .merge(crate::diagnostics::routes())
        .merge(crate::auth::routes())
        .merge(crate::medicine::routes())
        .merge(pages::routes(&state.config.frontend_dir))
        .fallback_service(static_files)
        .layer(middleware::map_response_with_state(
            state.clone(),
            reveal_error_detail,
        ))
        .layer(CatchPanicLayer::custom(panic_response(
            state.config.expose_error_details,
        )))
        .layer(middleware::from_fn(log_requests))
        .layer(cors_layer)
        .with_state(state)
}

/// Middleware: Log requests
async fn log_requests(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let started = Instant::now();

    let res = next.run(req).await;

    let status = res.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if status.is_server_error() {
        warn!(%method, %uri, status = status.as_u16(), elapsed_ms, "request failed");
    } else {
        info!(%method, %uri, status = status.as_u16(), elapsed_ms, "request handled");
    }
    res
}
