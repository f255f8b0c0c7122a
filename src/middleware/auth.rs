use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    extract::{FromRequestParts, RawPathParams, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};
use uuid::Uuid;

use warden_auth::{AuthMethod, CredentialRequest, Identity};
use warden_core::AppError;

use crate::state::AppState;

/// The authenticated caller, attached by [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub identity: Arc<Identity>,
    pub method: AuthMethod,
}

/// Id of the authenticated caller.
///
/// Set on the request for handlers and on the response for the request
/// logger, which runs outside the auth gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUserId(pub Uuid);

/// The bearer token that authenticated this request.
#[derive(Debug, Clone)]
pub struct VerifiedToken(pub String);

/// The auth gate. Rejects with `401 {"message": "[Auth] error: ..."}` unless
/// the request carries a credential that resolves to a user.
pub async fn require_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();

    let params: Vec<(String, String)> = RawPathParams::from_request_parts(&mut parts, &state)
        .await
        .map(|params| {
            params
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect()
        })
        .unwrap_or_default();

    let credentials = CredentialRequest::from_parts(&parts, params);

    let authenticated = match state.authenticator.authenticate(&credentials).await {
        Ok(authenticated) => authenticated,
        Err(rejection) => {
            warn!(
                path = %parts.uri.path(),
                reason = %rejection,
                "Request rejected by auth gate"
            );
            return rejection.into_response();
        }
    };

    let user_id = authenticated.identity.id;
    debug!(user_id = %user_id, method = authenticated.method.as_str(), "Request authenticated");

    parts.extensions.insert(CurrentUserId(user_id));
    parts.extensions.insert(CurrentUser {
        identity: Arc::new(authenticated.identity),
        method: authenticated.method,
    });
    if let Some(token) = authenticated.verified_token {
        parts.extensions.insert(VerifiedToken(token));
    }

    let mut response = next.run(Request::from_parts(parts, body)).await;
    response.extensions_mut().insert(CurrentUserId(user_id));
    response
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized(anyhow!("Authentication required")))
    }
}

impl CurrentUser {
    /// Passes when the caller owns `target_id` or holds `action` on `entity`.
    pub fn require_owner_or_permission(
        &self,
        target_id: &str,
        action: &str,
        entity: &str,
    ) -> Result<(), AppError> {
        if self.identity.can_update(target_id) {
            return Ok(());
        }
        self.identity
            .require_permission(action, entity)
            .map_err(AppError::forbidden)
    }
}

/// Declares an extractor that requires the caller to hold `action` on
/// `entity`, rejecting with 403 otherwise.
#[macro_export]
macro_rules! require_permission {
    ($name:ident, $action:expr, $entity:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::CurrentUser);

        impl<S> axum::extract::FromRequestParts<S> for $name
        where
            S: Send + Sync,
        {
            type Rejection = warden_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &S,
            ) -> Result<Self, Self::Rejection> {
                let user = <$crate::middleware::auth::CurrentUser as axum::extract::FromRequestParts<
                    S,
                >>::from_request_parts(parts, state)
                .await?;

                user.identity
                    .require_permission($action, $entity)
                    .map_err(warden_core::AppError::forbidden)?;

                Ok($name(user))
            }
        }
    };
}

require_permission!(
    RequireUsersList,
    warden_core::permissions::actions::LIST,
    warden_core::permissions::entities::USERS
);
