use axum::{routing::get, Router};
use std::sync::Arc;
use super::AppState;
use super::handlers;

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        // Health (public)
        .route("/health", get(handlers::health::health_check))
        // Client address check
        .route("/ipv4", get(handlers::ipv4::authenticate))
        // Deny list summary
        .route("/api/v1/deny", get(handlers::deny::summary))
        // Prometheus metrics (public)
        .route("/metrics", get(handlers::metrics::prometheus_metrics))
        .with_state(state)
}
