use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::{error, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub database: &'static str,
    /// `disabled` when no cache is configured.
    pub cache: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SecureHealthResponse {
    pub status: &'static str,
    pub user_id: Uuid,
    pub auth_method: &'static str,
}

const UP: &str = "up";
const DOWN: &str = "down";

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is alive", body = String)),
    tag = "Health"
)]
pub async fn health() -> &'static str {
    "OK"
}

/// Public status endpoint
#[utoipa::path(
    get,
    path = "/api/status",
    responses((status = 200, description = "API is reachable", body = String)),
    tag = "Health"
)]
pub async fn status() -> &'static str {
    "OK"
}

/// Readiness probe: checks the database and, when enabled, the cache
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "All dependencies are reachable", body = ReadinessResponse),
        (status = 503, description = "A dependency is down", body = ReadinessResponse)
    ),
    tag = "Health"
)]
#[instrument(skip(state))]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let database = match warden_db::ping(&state.db).await {
        Ok(()) => UP,
        Err(e) => {
            error!(error = %e, "Database readiness check failed");
            DOWN
        }
    };

    let cache = match &state.cache {
        None => "disabled",
        Some(cache) => match cache.probe().await {
            Ok(()) => UP,
            Err(e) => {
                error!(error = %e, "Cache readiness check failed");
                DOWN
            }
        },
    };

    let ready = database == UP && cache != DOWN;
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            status: if ready { "ready" } else { "unavailable" },
            database,
            cache,
        }),
    )
}

/// Health check behind the auth gate
#[utoipa::path(
    get,
    path = "/secure-health",
    responses(
        (status = 200, description = "Caller is authenticated", body = SecureHealthResponse),
        (status = 401, description = "Rejected by the auth gate", body = warden_auth::AuthErrorResponse)
    ),
    security(("api_key" = []), ("bearer_auth" = [])),
    tag = "Health"
)]
pub async fn secure_health(user: CurrentUser) -> Json<SecureHealthResponse> {
    Json(SecureHealthResponse {
        status: "OK",
        user_id: user.identity.id,
        auth_method: user.method.as_str(),
    })
}
