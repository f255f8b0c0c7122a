//! Error types for the auth gate.
//!
//! [`AuthError`] is the complete rejection taxonomy. Every variant renders
//! as `401 {"message": "[Auth] error: <cause>"}`; the variants differ only
//! in the cause string and in how the gate reacts to them:
//!
//! - **Absence** ([`AuthError::is_absence`]): no credential at a location.
//!   On the API key path this falls through to bearer tokens.
//! - **Malformed**: a credential is present but unusable. Never falls through.
//! - **Forbidden**: the credential is well formed but rejected.
//! - **Missing expiry**: a token without `exp`, reported on its own.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Prefix for every rejection message sent to clients.
pub const AUTH_ERROR_PREFIX: &str = "[Auth] error: ";

/// Body of a 401 from the auth gate.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthErrorResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    // Absence
    #[error("auth header is empty")]
    EmptyAuthHeader,
    #[error("api key header is empty")]
    EmptyApiKeyHeader,
    #[error("query token is empty")]
    EmptyQueryToken,
    #[error("cookie token is empty")]
    EmptyCookieToken,
    #[error("parameter token is empty")]
    EmptyParamToken,

    // Malformed
    #[error("auth header is invalid")]
    InvalidAuthHeader,
    #[error("api key header is invalid")]
    InvalidApiKeyHeader,
    #[error("invalid token")]
    MalformedToken,
    #[error("token is missing the [{0}] claim")]
    MissingClaim(&'static str),
    #[error("invalid signing algorithm")]
    InvalidSigningAlgorithm,

    // Forbidden
    #[error("signature is invalid")]
    InvalidSignature,
    #[error("token is expired")]
    ExpiredToken,
    #[error("token used before issued")]
    TokenUsedBeforeIssued,
    #[error("token is not valid yet")]
    TokenNotValidYet,
    #[error("you don't have permission to access this resource")]
    Forbidden,

    #[error("missing exp field")]
    MissingExpField,
}

impl AuthError {
    /// True when the credential simply was not present at the location.
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            AuthError::EmptyAuthHeader
                | AuthError::EmptyApiKeyHeader
                | AuthError::EmptyQueryToken
                | AuthError::EmptyCookieToken
                | AuthError::EmptyParamToken
        )
    }

    /// True when a credential was present but could not be parsed.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidAuthHeader
                | AuthError::InvalidApiKeyHeader
                | AuthError::MalformedToken
                | AuthError::MissingClaim(_)
                | AuthError::InvalidSigningAlgorithm
        )
    }

    /// Message sent to the client.
    pub fn client_message(&self) -> String {
        format!("{}{}", AUTH_ERROR_PREFIX, self)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = AuthErrorResponse {
            message: self.client_message(),
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// Outcome of an identity lookup that did not produce an identity.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("identity not found")]
    NotFound,

    /// The lookup arguments can never match, e.g. an empty provider.
    #[error("invalid lookup: {0}")]
    InvalidLookup(String),

    #[error("identity store unavailable: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ResolveError {
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ResolveError::Storage(Box::new(err))
    }
}

/// A permission model check that did not pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("user has no [{0}] roleID")]
    MissingRole(i32),
    #[error("user has no permission: [{0}]")]
    MissingPermission(String),
    #[error("user has no [{0}] permission")]
    MissingPermissionTag(String),
    #[error("user [{0}] is not the owner")]
    NotOwner(String),
}

/// Invalid auth configuration, detected when the gate is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("lookup [{0}] has no usable `source:name` entries")]
    EmptyLookup(String),
    #[error("unsupported signing algorithm [{0}], expected one of HS256, HS384, HS512")]
    UnsupportedAlgorithm(String),
    #[error("jwt secret must not be empty")]
    EmptySecret,
    #[error("token head name must not be empty")]
    EmptyHeadName,
}
