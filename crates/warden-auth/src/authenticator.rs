//! The auth gate state machine.
//!
//! ```text
//! START -> TRY_API_KEY -> AUTHENTICATED
//!                      -> TRY_TOKEN -> AUTHENTICATED
//!                                   -> REJECTED
//!                      -> REJECTED
//! ```
//!
//! The API key path always runs first. Only an *absent* API key moves on to
//! the bearer token path; a malformed one is rejected immediately. Once an API
//! key is found, the bearer token is never looked at, even when resolution
//! fails. Every resolver failure becomes [`AuthError::Forbidden`]; storage
//! failures are logged at error level so they can be told apart from bad
//! credentials.

use std::sync::Arc;

use tracing::{debug, error, warn};

use warden_config::{AuthConfig, JwtConfig};

use crate::error::{AuthError, ResolveError, SetupError};
use crate::extractor::{CredentialExtractor, CredentialRequest, LookupExtractor};
use crate::identity::Identity;
use crate::jwt::{JwtCodec, TokenValidator};
use crate::resolver::IdentityResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    ApiKey,
    Bearer,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::ApiKey => "api_key",
            AuthMethod::Bearer => "bearer",
        }
    }
}

/// A request that passed the gate.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub identity: Identity,
    pub method: AuthMethod,
    /// The raw bearer token, set only for [`AuthMethod::Bearer`].
    pub verified_token: Option<String>,
}

#[derive(Clone)]
pub struct Authenticator {
    extractor: Arc<dyn CredentialExtractor>,
    validator: Arc<dyn TokenValidator>,
    resolver: Arc<dyn IdentityResolver>,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}

impl Authenticator {
    pub fn new(
        extractor: Arc<dyn CredentialExtractor>,
        validator: Arc<dyn TokenValidator>,
        resolver: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self {
            extractor,
            validator,
            resolver,
        }
    }

    /// Wires the lookup extractor and HMAC validator from configuration.
    pub fn from_config(
        auth_config: &AuthConfig,
        jwt_config: &JwtConfig,
        resolver: Arc<dyn IdentityResolver>,
    ) -> Result<Self, SetupError> {
        let extractor = LookupExtractor::from_config(auth_config)?;
        let validator = JwtCodec::new(jwt_config)?;

        debug!(
            api_key_lookup = %extractor.api_key_lookup(),
            token_lookup = %extractor.token_lookup(),
            algorithm = ?validator.algorithm(),
            "Auth gate configured"
        );

        Ok(Self::new(Arc::new(extractor), Arc::new(validator), resolver))
    }

    pub async fn authenticate(
        &self,
        request: &CredentialRequest,
    ) -> Result<Authenticated, AuthError> {
        match self.extractor.api_key(request) {
            Ok(api_key) => return self.authenticate_api_key(&api_key).await,
            Err(err) if err.is_absence() => {
                debug!(reason = %err, "No API key supplied, trying bearer token");
            }
            Err(err) => return Err(err),
        }

        let token = self.extractor.bearer_token(request)?;
        let claims = self.validator.validate(&token)?;

        if let Some(audience) = &claims.audience {
            debug!(audience = ?audience, "Token audience observed");
        }
        if let Some(algorithm) = &claims.algorithm {
            debug!(algorithm = %algorithm, "Token alg claim observed");
        }

        let identity = self
            .resolver
            .resolve_by_claims(&claims.subject, &claims.issuer, &claims.token_id)
            .await
            .map_err(|err| resolution_failed(err, AuthMethod::Bearer))?;

        debug!(user_id = %identity.id, issuer = %claims.issuer, "User authenticated via bearer token");

        Ok(Authenticated {
            identity,
            method: AuthMethod::Bearer,
            verified_token: Some(token),
        })
    }

    async fn authenticate_api_key(&self, api_key: &str) -> Result<Authenticated, AuthError> {
        let identity = self
            .resolver
            .resolve_by_api_key(api_key)
            .await
            .map_err(|err| resolution_failed(err, AuthMethod::ApiKey))?;

        debug!(user_id = %identity.id, "User authenticated via api key");

        Ok(Authenticated {
            identity,
            method: AuthMethod::ApiKey,
            verified_token: None,
        })
    }
}

fn resolution_failed(err: ResolveError, method: AuthMethod) -> AuthError {
    match &err {
        ResolveError::Storage(_) => {
            error!(method = method.as_str(), error = %err, "Identity lookup failed");
        }
        ResolveError::NotFound | ResolveError::InvalidLookup(_) => {
            warn!(method = method.as_str(), reason = %err, "Credential did not resolve to a user");
        }
    }
    AuthError::Forbidden
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::TokenClaims;
    use async_trait::async_trait;
    use axum::http::{HeaderValue, Request};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    const SECRET: &str = "gate-secret";

    #[derive(Default)]
    struct FakeResolver {
        api_keys: HashMap<String, Identity>,
        profiles: HashMap<(String, String, String), Identity>,
        storage_down: bool,
    }

    #[derive(Debug)]
    struct Down;

    impl std::fmt::Display for Down {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("connection refused")
        }
    }

    impl std::error::Error for Down {}

    #[async_trait]
    impl IdentityResolver for FakeResolver {
        async fn resolve_by_api_key(&self, api_key: &str) -> Result<Identity, ResolveError> {
            if self.storage_down {
                return Err(ResolveError::storage(Down));
            }
            self.api_keys
                .get(api_key)
                .cloned()
                .ok_or(ResolveError::NotFound)
        }

        async fn resolve_by_claims(
            &self,
            email: &str,
            issuer: &str,
            subject_id: &str,
        ) -> Result<Identity, ResolveError> {
            if self.storage_down {
                return Err(ResolveError::storage(Down));
            }
            self.profiles
                .get(&(email.into(), issuer.into(), subject_id.into()))
                .cloned()
                .ok_or(ResolveError::NotFound)
        }
    }

    struct CountingValidator {
        inner: JwtCodec,
        calls: AtomicUsize,
    }

    impl TokenValidator for CountingValidator {
        fn validate(&self, token: &str) -> Result<TokenClaims, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.validate(token)
        }
    }

    struct Gate {
        authenticator: Authenticator,
        validator: Arc<CountingValidator>,
        codec: JwtCodec,
        api_user: Identity,
        jwt_user: Identity,
    }

    fn gate_with(storage_down: bool) -> Gate {
        let jwt_config = JwtConfig {
            secret: SECRET.into(),
            ..JwtConfig::default()
        };
        let codec = JwtCodec::new(&jwt_config).unwrap();

        let api_user = Identity::new(Uuid::new_v4(), "api@test.com").with_role(1, "admin");
        let jwt_user = Identity::new(Uuid::new_v4(), "jwt@test.com").with_role(2, "user");

        let mut resolver = FakeResolver {
            storage_down,
            ..FakeResolver::default()
        };
        resolver
            .api_keys
            .insert("validkey123".into(), api_user.clone());
        resolver.profiles.insert(
            ("jwt@test.com".into(), "google".into(), "g-42".into()),
            jwt_user.clone(),
        );

        let validator = Arc::new(CountingValidator {
            inner: codec.clone(),
            calls: AtomicUsize::new(0),
        });
        let extractor = LookupExtractor::from_config(&AuthConfig::default()).unwrap();
        let authenticator = Authenticator::new(
            Arc::new(extractor),
            validator.clone(),
            Arc::new(resolver),
        );

        Gate {
            authenticator,
            validator,
            codec,
            api_user,
            jwt_user,
        }
    }

    fn gate() -> Gate {
        gate_with(false)
    }

    impl Gate {
        fn token_for_jwt_user(&self) -> String {
            self.codec
                .issue("google", "jwt@test.com", "g-42", 300)
                .unwrap()
                .token
        }

        fn validator_calls(&self) -> usize {
            self.validator.calls.load(Ordering::SeqCst)
        }
    }

    fn request(uri: &str, headers: &[(&str, &str)]) -> CredentialRequest {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (parts, _) = builder.body(()).unwrap().into_parts();
        CredentialRequest::from_parts(&parts, Vec::new())
    }

    #[tokio::test]
    async fn api_key_authenticates() {
        let gate = gate();
        let outcome = gate
            .authenticator
            .authenticate(&request("/", &[("x-api-key", "validkey123")]))
            .await
            .unwrap();

        assert_eq!(outcome.method, AuthMethod::ApiKey);
        assert_eq!(outcome.identity.id, gate.api_user.id);
        assert!(outcome.verified_token.is_none());
    }

    #[tokio::test]
    async fn api_key_takes_precedence_over_bearer() {
        let gate = gate();
        let bearer = format!("Bearer {}", gate.token_for_jwt_user());
        let outcome = gate
            .authenticator
            .authenticate(&request(
                "/",
                &[("x-api-key", "validkey123"), ("authorization", &bearer)],
            ))
            .await
            .unwrap();

        assert_eq!(outcome.identity.id, gate.api_user.id);
        assert_eq!(gate.validator_calls(), 0);
    }

    #[tokio::test]
    async fn unknown_api_key_is_forbidden_without_trying_bearer() {
        let gate = gate();
        let bearer = format!("Bearer {}", gate.token_for_jwt_user());
        let err = gate
            .authenticator
            .authenticate(&request(
                "/?api_key=nope",
                &[("authorization", &bearer)],
            ))
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::Forbidden);
        assert_eq!(gate.validator_calls(), 0);
    }

    #[tokio::test]
    async fn malformed_api_key_fails_fast() {
        let gate = gate();
        let bearer = format!("Bearer {}", gate.token_for_jwt_user());
        let mut headers = request("/", &[("authorization", &bearer)]).headers().clone();
        headers.insert("x-api-key", HeaderValue::from_bytes(b"caf\xc3\xa9").unwrap());
        let req = CredentialRequest::new(headers, &"/".parse().unwrap());

        let err = gate.authenticator.authenticate(&req).await.unwrap_err();

        assert_eq!(err, AuthError::InvalidApiKeyHeader);
        assert_eq!(gate.validator_calls(), 0);
    }

    #[tokio::test]
    async fn bearer_token_authenticates_when_no_api_key() {
        let gate = gate();
        let token = gate.token_for_jwt_user();
        let outcome = gate
            .authenticator
            .authenticate(&request(
                "/",
                &[("authorization", &format!("Bearer {}", token))],
            ))
            .await
            .unwrap();

        assert_eq!(outcome.method, AuthMethod::Bearer);
        assert_eq!(outcome.identity.id, gate.jwt_user.id);
        assert_eq!(outcome.verified_token.as_deref(), Some(token.as_str()));
        assert_eq!(gate.validator_calls(), 1);
    }

    #[tokio::test]
    async fn no_credentials_reports_absence() {
        let gate = gate();
        let err = gate
            .authenticator
            .authenticate(&request("/", &[]))
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::EmptyAuthHeader);
        assert!(err.is_absence());
    }

    #[tokio::test]
    async fn wrong_scheme_is_malformed() {
        let gate = gate();
        let err = gate
            .authenticator
            .authenticate(&request("/", &[("authorization", "NotBearer xyz")]))
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::InvalidAuthHeader);
        assert_eq!(gate.validator_calls(), 0);
    }

    #[tokio::test]
    async fn token_for_unknown_profile_is_forbidden() {
        let gate = gate();
        let token = gate
            .codec
            .issue("github", "jwt@test.com", "g-42", 300)
            .unwrap()
            .token;
        let err = gate
            .authenticator
            .authenticate(&request(
                "/",
                &[("authorization", &format!("Bearer {}", token))],
            ))
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::Forbidden);
    }

    #[tokio::test]
    async fn validation_errors_are_surfaced() {
        let gate = gate();
        let err = gate
            .authenticator
            .authenticate(&request("/", &[("authorization", "Bearer not.a.jwt")]))
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::MalformedToken);
    }

    #[tokio::test]
    async fn storage_failure_collapses_to_forbidden() {
        let gate = gate_with(true);

        let err = gate
            .authenticator
            .authenticate(&request("/", &[("x-api-key", "validkey123")]))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Forbidden);

        let token = gate.token_for_jwt_user();
        let err = gate
            .authenticator
            .authenticate(&request(
                "/",
                &[("authorization", &format!("Bearer {}", token))],
            ))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Forbidden);
    }

    #[test]
    fn from_config_rejects_bad_setup() {
        let resolver: Arc<dyn IdentityResolver> = Arc::new(FakeResolver::default());

        let bad_lookup = AuthConfig {
            token_lookup: "body:token".into(),
            ..AuthConfig::default()
        };
        assert!(matches!(
            Authenticator::from_config(&bad_lookup, &JwtConfig::default(), resolver.clone()),
            Err(SetupError::EmptyLookup(_))
        ));

        let bad_alg = JwtConfig {
            algorithm: "RS256".into(),
            ..JwtConfig::default()
        };
        assert!(matches!(
            Authenticator::from_config(&AuthConfig::default(), &bad_alg, resolver),
            Err(SetupError::UnsupportedAlgorithm(_))
        ));
    }
}
