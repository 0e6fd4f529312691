//! Application State
//!
//! The store handle travels through handlers inside [`AppState`] rather than
//! living in a global.

use std::sync::Arc;

use tracing::info;

use crate::config::AppConfig;
use crate::medicine::MedicineRepository;

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

pub struct AppState {
    /// Data access for the medicine collection.
    pub medicines: MedicineRepository,

    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig, medicines: MedicineRepository) -> Self {
        info!(frontend_dir = %config.frontend_dir.display(), "serving pages");
        Self { medicines, config }
    }
}
