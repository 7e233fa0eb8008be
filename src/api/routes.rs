//! API Routes
//!
//! Configures the Axum router: admin endpoints under `/__worker/` and the
//! proxy fallback for everything else.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{health_handler, proxy_handler, stats_handler, update_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /__worker/health` - Health and controlling version
/// - `GET /__worker/stats` - Cache statistics
/// - `POST /__worker/update` - Install and activate a new version
/// - anything else - Proxied through the controlling worker
///
/// # Middleware
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/__worker/health", get(health_handler))
        .route("/__worker/stats", get(stats_handler))
        .route("/__worker/update", post(update_handler))
        .fallback(proxy_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
