//! HTML page routes
//!
//! Each page is a fixed file in the frontend directory.

use std::path::Path;

use axum::Router;
use tower_http::services::ServeFile;

use crate::state::SharedState;

/// Route path and the file it serves.
pub const PAGES: &[(&str, &str)] = &[
    ("/", "index.html"),
    ("/dashboard", "dashboard.html"),
    ("/add-medicine", "add-medicine.html"),
    ("/view-medicines", "view-medicines.html"),
    ("/billing", "billing.html"),
];

/// Creates routes for the HTML pages
pub fn routes(frontend_dir: &Path) -> Router<SharedState> {
    PAGES.iter().fold(Router::new(), |router, (path, file)| {
        router.route_service(path, ServeFile::new(frontend_dir.join(file)))
    })
}
