//! API Routes
//!
//! Configures the Axum router: admin endpoints under `/_cache`, every other
//! path is a cache lookup.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{clear_handler, health_handler, proxy_handler, stats_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /_cache/stats` - Cache statistics
/// - `GET /_cache/health` - Health check endpoint
/// - `DELETE /_cache` - Clear the cache
/// - any other path - Cache-aside lookup of the percent-decoded path
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/_cache", delete(clear_handler))
        .route("/_cache/stats", get(stats_handler))
        .route("/_cache/health", get(health_handler))
        .fallback(proxy_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
