use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::openapi::server::Server;
use utoipa::{Modify, OpenApi};

use warden_auth::{AuthErrorResponse, IssuedToken};
use warden_config::ServerConfig;
use warden_config::auth::DEFAULT_API_KEY_HEADER;
use warden_core::ErrorResponse;
use warden_models::{
    ApiKeySummary, CreateApiKeyDto, CreatedApiKey, CurrentUserResponse, PaginationParams,
    RoleInfo, UpdateUserDto, User,
};

use crate::modules::health::controller::{ReadinessResponse, SecureHealthResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::health::controller::health,
        crate::modules::health::controller::readiness,
        crate::modules::health::controller::status,
        crate::modules::health::controller::secure_health,
        crate::modules::users::controller::get_me,
        crate::modules::users::controller::list_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::list_api_keys,
        crate::modules::users::controller::create_api_key,
        crate::modules::users::controller::revoke_api_key,
    ),
    components(
        schemas(
            User,
            RoleInfo,
            CurrentUserResponse,
            UpdateUserDto,
            CreateApiKeyDto,
            CreatedApiKey,
            ApiKeySummary,
            PaginationParams,
            IssuedToken,
            ReadinessResponse,
            SecureHealthResponse,
            ErrorResponse,
            AuthErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Users", description = "User endpoints"),
        (name = "API Keys", description = "Per-user API key management")
    ),
    info(
        title = "Warden API",
        version = "0.1.0",
        description = "REST service with API key and JWT bearer authentication and role/permission based authorization.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(DEFAULT_API_KEY_HEADER))),
            );
        }
    }
}

/// The OpenAPI document with the versioned base path as its server.
pub fn api_doc(server: &ServerConfig) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.servers = Some(vec![Server::new(server.versioned_endpoint(""))]);
    doc
}
