//! Credential extraction from request state.
//!
//! [`CredentialRequest`] is a read-only view of the parts of a request that
//! can carry a credential. [`LookupExtractor`] walks a [`LookupChain`] over
//! that view and returns the first non-empty value. When every location
//! misses, the error of the last attempted location is returned.

use std::collections::HashMap;

use axum::extract::Query;
use axum::http::{HeaderMap, Uri, request::Parts};
use axum_extra::extract::cookie::CookieJar;

use warden_config::AuthConfig;

use crate::error::{AuthError, SetupError};
use crate::lookup::{LookupChain, LookupLocation, LookupSource};

/// The credential-bearing parts of one request.
#[derive(Debug, Clone, Default)]
pub struct CredentialRequest {
    headers: HeaderMap,
    query: Vec<(String, String)>,
    cookies: CookieJar,
    params: HashMap<String, String>,
}

impl CredentialRequest {
    pub fn new(headers: HeaderMap, uri: &Uri) -> Self {
        // An unparseable query string carries no credentials.
        let query = Query::<Vec<(String, String)>>::try_from_uri(uri)
            .map(|Query(pairs)| pairs)
            .unwrap_or_default();
        let cookies = CookieJar::from_headers(&headers);

        Self {
            headers,
            query,
            cookies,
            params: HashMap::new(),
        }
    }

    /// Builds a view from request parts plus the matched route parameters.
    pub fn from_parts<I>(parts: &Parts, params: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self::new(parts.headers.clone(), &parts.uri).with_params(params)
    }

    pub fn with_params<I>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.params.extend(params);
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a query parameter.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(|cookie| cookie.value())
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Locates API keys and bearer tokens in a request.
pub trait CredentialExtractor: Send + Sync {
    fn api_key(&self, request: &CredentialRequest) -> Result<String, AuthError>;

    fn bearer_token(&self, request: &CredentialRequest) -> Result<String, AuthError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CredentialKind {
    ApiKey,
    Bearer,
}

/// Extractor driven by the configured lookup chains.
#[derive(Debug, Clone)]
pub struct LookupExtractor {
    api_key_lookup: LookupChain,
    token_lookup: LookupChain,
    token_head_name: String,
}

impl LookupExtractor {
    pub fn new(
        api_key_lookup: LookupChain,
        token_lookup: LookupChain,
        token_head_name: impl Into<String>,
    ) -> Result<Self, SetupError> {
        let token_head_name = token_head_name.into();
        if token_head_name.trim().is_empty() {
            return Err(SetupError::EmptyHeadName);
        }

        Ok(Self {
            api_key_lookup,
            token_lookup,
            token_head_name,
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, SetupError> {
        Self::new(
            LookupChain::parse(&config.api_key_lookup)?,
            LookupChain::parse(&config.token_lookup)?,
            config.token_head_name.trim(),
        )
    }

    pub fn api_key_lookup(&self) -> &LookupChain {
        &self.api_key_lookup
    }

    pub fn token_lookup(&self) -> &LookupChain {
        &self.token_lookup
    }

    fn extract(
        &self,
        request: &CredentialRequest,
        chain: &LookupChain,
        kind: CredentialKind,
    ) -> Result<String, AuthError> {
        let mut last_error = None;

        for location in chain.locations() {
            match self.from_location(request, location, kind) {
                Ok(value) => return Ok(value),
                Err(err) => last_error = Some(err),
            }
        }

        Err(last_error.unwrap_or(match kind {
            CredentialKind::ApiKey => AuthError::EmptyApiKeyHeader,
            CredentialKind::Bearer => AuthError::EmptyAuthHeader,
        }))
    }

    fn from_location(
        &self,
        request: &CredentialRequest,
        location: &LookupLocation,
        kind: CredentialKind,
    ) -> Result<String, AuthError> {
        let name = location.name.as_str();
        match location.source {
            LookupSource::Header => match kind {
                CredentialKind::ApiKey => api_key_from_header(request, name),
                CredentialKind::Bearer => token_from_header(request, name, &self.token_head_name),
            },
            LookupSource::Query => non_empty(request.query(name), AuthError::EmptyQueryToken),
            LookupSource::Cookie => non_empty(request.cookie(name), AuthError::EmptyCookieToken),
            LookupSource::Param => non_empty(request.param(name), AuthError::EmptyParamToken),
        }
    }
}

impl CredentialExtractor for LookupExtractor {
    fn api_key(&self, request: &CredentialRequest) -> Result<String, AuthError> {
        self.extract(request, &self.api_key_lookup, CredentialKind::ApiKey)
    }

    fn bearer_token(&self, request: &CredentialRequest) -> Result<String, AuthError> {
        self.extract(request, &self.token_lookup, CredentialKind::Bearer)
    }
}

fn non_empty(value: Option<&str>, absent: AuthError) -> Result<String, AuthError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(absent),
    }
}

fn api_key_from_header(request: &CredentialRequest, name: &str) -> Result<String, AuthError> {
    let Some(value) = request.headers().get(name) else {
        return Err(AuthError::EmptyApiKeyHeader);
    };
    if value.is_empty() {
        return Err(AuthError::EmptyApiKeyHeader);
    }

    value
        .to_str()
        .map(str::to_string)
        .map_err(|_| AuthError::InvalidApiKeyHeader)
}

/// Expects `<head_name> <token>`, e.g. `Bearer eyJhbGciOi...`.
fn token_from_header(
    request: &CredentialRequest,
    name: &str,
    head_name: &str,
) -> Result<String, AuthError> {
    let Some(value) = request.headers().get(name) else {
        return Err(AuthError::EmptyAuthHeader);
    };
    if value.is_empty() {
        return Err(AuthError::EmptyAuthHeader);
    }

    let value = value.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
    match value.split_once(' ') {
        Some((scheme, token)) if scheme == head_name && !token.is_empty() => Ok(token.to_string()),
        _ => Err(AuthError::InvalidAuthHeader),
    }
}
