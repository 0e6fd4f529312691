use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use pharmacy_rust::config::AppConfig;
use pharmacy_rust::medicine::MedicineRepository;
use pharmacy_rust::router::create_app_router;
use pharmacy_rust::startup::{connect_store, log_startup_banner, seed_sample_data};
use pharmacy_rust::state::AppState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment may already be set.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    info!(
        port = config.port,
        backend = ?config.store.backend,
        development = config.expose_error_details,
        "Configuration loaded"
    );

    // Connect to the record store and seed it on first run
    let connection = connect_store(&config.store).await?;
    let medicines = MedicineRepository::new(connection.store);
    if !connection.detached {
        seed_sample_data(&medicines).await;
    }

    // Build application router with all routes and middleware
    let port = config.port;
    let state = Arc::new(AppState::new(config, medicines));
    let app = create_app_router(state);

    // Configure the server address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    log_startup_banner(port, connection.detached);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
