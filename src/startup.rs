//! Startup orchestration: store connection, sample seeding, and the banner.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::{StoreBackend, StoreConfig};
use crate::medicine::{MedicineRepository, SeedOutcome};
use crate::router::pages::PAGES;
use crate::store::{
    DetachedStore, InMemoryMedicineStore, MedicineStore, MongoMedicineStore, StoreError,
};

/// Errors that stop the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("cannot start without a database connection: {0}")]
    StoreConnection(#[source] StoreError),
}

/// The store the service will run against.
pub struct StoreConnection {
    pub store: Arc<dyn MedicineStore>,

    /// True when the store could not be reached and the service runs
    /// without one.
    pub detached: bool,
}

/// Connects to the configured store.
///
/// A MongoDB connection failure is fatal unless `start_without_store` is
/// set, in which case a [`DetachedStore`] takes its place.
pub async fn connect_store(config: &StoreConfig) -> Result<StoreConnection, StartupError> {
    match config.backend {
        StoreBackend::Memory => {
            warn!("using the in-memory store; data is lost on restart");
            Ok(StoreConnection {
                store: Arc::new(InMemoryMedicineStore::new()),
                detached: false,
            })
        }
        StoreBackend::Mongo => {
            info!(timeout_ms = config.connect_timeout.as_millis() as u64, "connecting to MongoDB");
            match MongoMedicineStore::connect(config).await {
                Ok(store) => {
                    let details = store.info();
                    info!(host = %details.host, database = %details.database, "MongoDB connected");
                    Ok(StoreConnection {
                        store: Arc::new(store),
                        detached: false,
                    })
                }
                Err(err) => {
                    log_connection_hints(&err, config);
                    if !config.start_without_store {
                        return Err(StartupError::StoreConnection(err));
                    }
                    warn!("starting without a database: pages work, medicine operations will fail");
                    Ok(StoreConnection {
                        store: Arc::new(DetachedStore::new(MongoMedicineStore::detached_info(
                            config,
                        ))),
                        detached: true,
                    })
                }
            }
        }
    }
}

fn log_connection_hints(err: &StoreError, config: &StoreConfig) {
    error!(error = %err, "MongoDB connection failed");
    warn!("check the MONGODB_URI connection string (or the .env file)");
    warn!("make sure this host's IP address is allowed by the cluster's network access list");
    warn!("check the database username and password");
    warn!(
        uri_set = config.uri.is_some(),
        timeout_ms = config.connect_timeout.as_millis() as u64,
        "ensure network connectivity to the cluster"
    );
}

/// Seeds the sample catalogue into an empty store. Failures are logged and
/// never stop startup.
pub async fn seed_sample_data(medicines: &MedicineRepository) -> Option<SeedOutcome> {
    match medicines.seed_samples().await {
        Ok(outcome) => {
            if let SeedOutcome::AlreadyPopulated(count) = outcome {
                info!(count, "database already has medicines");
            }
            Some(outcome)
        }
        Err(err) => {
            error!(error = %err, "failed to create sample data");
            None
        }
    }
}

/// Logs the pages and endpoints the service exposes.
pub fn log_startup_banner(port: u16, detached: bool) {
    let base = format!("http://localhost:{port}");
    info!("Pharmacy Management System running on {base}");
    for (path, _) in PAGES {
        info!(page = %format!("{base}{path}"), "page available");
    }
    for (method, path) in [
        ("GET", "/api/health"),
        ("GET", "/api/test-db"),
        ("GET", "/api/medicines"),
        ("POST", "/api/medicines"),
        ("GET", "/api/medicines/:id"),
        ("PUT", "/api/medicines/:id"),
        ("DELETE", "/api/medicines/:id"),
        ("POST", "/api/login"),
        ("POST", "/api/medicines/bill/process"),
    ] {
        info!(method, endpoint = %format!("{base}{path}"), "endpoint available");
    }
    if detached {
        warn!("running without database; CRUD operations will not work");
    } else {
        info!("ready");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn store_config(backend: StoreBackend) -> StoreConfig {
        StoreConfig {
            backend,
            uri: None,
            database: None,
            connect_timeout: Duration::from_millis(50),
            start_without_store: false,
        }
    }

    #[tokio::test]
    async fn memory_backend_connects_immediately() {
        let connection = connect_store(&store_config(StoreBackend::Memory)).await.unwrap();
        assert!(!connection.detached);
        assert!(connection.store.ping().await);
    }

    #[tokio::test]
    async fn missing_uri_is_fatal_by_default() {
        let result = connect_store(&store_config(StoreBackend::Mongo)).await;
        assert!(matches!(result, Err(StartupError::StoreConnection(_))));
    }

    #[tokio::test]
    async fn unreachable_store_can_start_detached() {
        let mut config = store_config(StoreBackend::Mongo);
        config.start_without_store = true;

        let connection = connect_store(&config).await.unwrap();
        assert!(connection.detached);
        assert!(!connection.store.ping().await);
    }

    #[tokio::test]
    async fn seeding_reports_outcome() {
        let repo = MedicineRepository::new(Arc::new(InMemoryMedicineStore::new()));
        assert_eq!(seed_sample_data(&repo).await, Some(SeedOutcome::Seeded(5)));
        assert_eq!(
            seed_sample_data(&repo).await,
            Some(SeedOutcome::AlreadyPopulated(5))
        );
    }
}
