use axum::{
    Router,
    routing::{delete, get},
};

use crate::modules::users::controller::{
    create_api_key, get_me, get_user, list_api_keys, list_users, revoke_api_key, update_user,
};
use crate::state::AppState;

/// User routes. Every route expects the auth gate in front of it.
pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/users", get(list_users))
        .route("/api/user/{id}", get(get_user).put(update_user))
        .route(
            "/api/user/{id}/api-keys",
            get(list_api_keys).post(create_api_key),
        )
        .route("/api/user/{id}/api-keys/{key_id}", delete(revoke_api_key))
}
