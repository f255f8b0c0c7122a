use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use warden_auth::AuthErrorResponse;
use warden_core::permissions::{actions, entities};
use warden_core::{AppError, ErrorResponse};
use warden_models::{
    ApiKeySummary, CreateApiKeyDto, CreatedApiKey, CurrentUserResponse, PaginationParams,
    UpdateUserDto, User,
};

use crate::middleware::auth::{CurrentUser, RequireUsersList};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

fn parse_user_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::bad_request(anyhow!("Invalid user id: {}", id)))
}

/// Get the authenticated caller with roles and permissions
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current user", body = CurrentUserResponse),
        (status = 401, description = "Rejected by the auth gate", body = AuthErrorResponse)
    ),
    security(("api_key" = []), ("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_me(user: CurrentUser) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse::from(user.identity.as_ref()))
}

/// List users (requires `list:users`)
#[utoipa::path(
    get,
    path = "/api/users",
    params(PaginationParams),
    responses(
        (status = 200, description = "Users", body = Vec<User>),
        (status = 401, description = "Rejected by the auth gate", body = AuthErrorResponse),
        (status = 403, description = "Missing permission", body = ErrorResponse)
    ),
    security(("api_key" = []), ("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, _user))]
pub async fn list_users(
    State(state): State<AppState>,
    RequireUsersList(_user): RequireUsersList,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = UserService::list_users(&state.db, &params).await?;
    Ok(Json(users))
}

/// Get a user (owner or `read:users`)
#[utoipa::path(
    get,
    path = "/api/user/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 401, description = "Rejected by the auth gate", body = AuthErrorResponse),
        (status = 403, description = "Not the owner and missing permission", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("api_key" = []), ("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, user), fields(caller = %user.identity.id))]
pub async fn get_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    user.require_owner_or_permission(&id, actions::READ, entities::USERS)?;
    let found = UserService::get_user(&state.db, parse_user_id(&id)?).await?;
    Ok(Json(found))
}

/// Update a user's names (owner or `update:users`)
#[utoipa::path(
    put,
    path = "/api/user/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 401, description = "Rejected by the auth gate", body = AuthErrorResponse),
        (status = 403, description = "Not the owner and missing permission", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("api_key" = []), ("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, user, dto), fields(caller = %user.identity.id))]
pub async fn update_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<User>, AppError> {
    user.require_owner_or_permission(&id, actions::UPDATE, entities::USERS)?;
    let updated = UserService::update_user(&state.db, parse_user_id(&id)?, dto).await?;
    Ok(Json(updated))
}

/// List a user's API keys (owner or `list:user_api_keys`)
#[utoipa::path(
    get,
    path = "/api/user/{id}/api-keys",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Active keys, first characters only", body = Vec<ApiKeySummary>),
        (status = 401, description = "Rejected by the auth gate", body = AuthErrorResponse),
        (status = 403, description = "Not the owner and missing permission", body = ErrorResponse)
    ),
    security(("api_key" = []), ("bearer_auth" = [])),
    tag = "API Keys"
)]
#[instrument(skip(state, user), fields(caller = %user.identity.id))]
pub async fn list_api_keys(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<ApiKeySummary>>, AppError> {
    user.require_owner_or_permission(&id, actions::LIST, entities::USER_API_KEYS)?;
    let keys = UserService::list_api_keys(&state.db, parse_user_id(&id)?).await?;
    Ok(Json(keys))
}

/// Create an API key (owner or `create:user_api_keys`)
#[utoipa::path(
    post,
    path = "/api/user/{id}/api-keys",
    params(("id" = String, Path, description = "User id")),
    request_body = CreateApiKeyDto,
    responses(
        (status = 201, description = "Key created. The full key is only returned here", body = CreatedApiKey),
        (status = 401, description = "Rejected by the auth gate", body = AuthErrorResponse),
        (status = 403, description = "Not the owner and missing permission", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("api_key" = []), ("bearer_auth" = [])),
    tag = "API Keys"
)]
#[instrument(skip(state, user, dto), fields(caller = %user.identity.id))]
pub async fn create_api_key(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<CreateApiKeyDto>,
) -> Result<(StatusCode, Json<CreatedApiKey>), AppError> {
    user.require_owner_or_permission(&id, actions::CREATE, entities::USER_API_KEYS)?;
    let key = UserService::create_api_key(&state.db, parse_user_id(&id)?, dto).await?;
    Ok((StatusCode::CREATED, Json(key)))
}

/// Revoke an API key (owner or `delete:user_api_keys`)
#[utoipa::path(
    delete,
    path = "/api/user/{id}/api-keys/{key_id}",
    params(
        ("id" = String, Path, description = "User id"),
        ("key_id" = i32, Path, description = "API key id")
    ),
    responses(
        (status = 204, description = "Key revoked"),
        (status = 401, description = "Rejected by the auth gate", body = AuthErrorResponse),
        (status = 403, description = "Not the owner and missing permission", body = ErrorResponse),
        (status = 404, description = "Key not found", body = ErrorResponse)
    ),
    security(("api_key" = []), ("bearer_auth" = [])),
    tag = "API Keys"
)]
#[instrument(skip(state, user), fields(caller = %user.identity.id))]
pub async fn revoke_api_key(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((id, key_id)): Path<(String, i32)>,
) -> Result<StatusCode, AppError> {
    user.require_owner_or_permission(&id, actions::DELETE, entities::USER_API_KEYS)?;
    UserService::revoke_api_key(&state.db, parse_user_id(&id)?, key_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
