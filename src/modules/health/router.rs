use axum::{Router, routing::get};

use crate::modules::health::controller::{health, readiness, secure_health, status};
use crate::state::AppState;

/// Routes that need no credentials.
pub fn init_health_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/api/status", get(status))
}

/// Health check for authenticated callers. Mount behind the auth gate.
pub fn init_secure_health_router() -> Router<AppState> {
    Router::new().route("/secure-health", get(secure_health))
}
