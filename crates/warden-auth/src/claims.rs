//! JWT claim structures.
//!
//! - [`RawClaims`]: the payload as it appears on the wire, every field optional
//! - [`TokenClaims`]: validated claims handed to the identity resolver
//! - [`Audience`]: the `aud` claim, which may be a string or a list

use serde::{Deserialize, Serialize};

/// The `aud` claim. Observed and logged, not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

/// Token payload before validation.
///
/// Numeric dates are accepted as integers or floats, as allowed by RFC 7519.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawClaims {
    /// Federation provider that issued the identity, e.g. `google`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// User email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// User id at the federation provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
}

/// Claims of a token that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// `iss`: federation provider name.
    pub issuer: String,
    /// `sub`: user email.
    pub subject: String,
    /// `jti`: external user id at the provider.
    pub token_id: String,
    /// `exp` as a Unix timestamp.
    pub expires_at: i64,
    pub issued_at: Option<i64>,
    pub not_before: Option<i64>,
    pub audience: Option<Audience>,
    pub algorithm: Option<String>,
}

/// Claims written into tokens issued by this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedClaims {
    pub iss: String,
    pub sub: String,
    pub jti: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}
