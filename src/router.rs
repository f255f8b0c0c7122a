use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use warden_config::auth::DEFAULT_API_KEY_HEADER;

use crate::docs::api_doc;
use crate::logging::logging_middleware;
use crate::middleware::auth::require_auth;
use crate::modules::health::router::{init_health_router, init_secure_health_router};
use crate::modules::users::router::init_users_router;
use crate::state::AppState;

/// Builds the application router.
///
/// Everything lives under the versioned prefix (`/v1` by default). Routes
/// merged into `protected` sit behind the auth gate; the health probes and
/// `/api/status` stay open.
pub fn init_router(state: AppState) -> Router {
    let doc = api_doc(&state.server_config);

    let protected = Router::new()
        .merge(init_secure_health_router())
        .merge(init_users_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let api = Router::new().merge(init_health_router()).merge(protected);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc.clone()))
        .merge(Scalar::with_url("/scalar", doc))
        .nest(&state.server_config.versioned_endpoint(""), api)
        .with_state(state.clone())
        .layer(cors_layer(&state))
        .layer(middleware::from_fn_with_state(state, logging_middleware))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(DEFAULT_API_KEY_HEADER),
        ])
        .allow_credentials(true)
}
