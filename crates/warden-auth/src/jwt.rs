//! Bearer token validation and issuance.
//!
//! [`JwtCodec`] holds the keys derived from [`JwtConfig`] and implements
//! [`TokenValidator`] for the auth gate. Validation runs in this order, and
//! the first failing step decides the error:
//!
//! 1. The token must have a decodable JOSE header ([`AuthError::MalformedToken`]).
//! 2. The header algorithm must equal the configured one
//!    ([`AuthError::InvalidSigningAlgorithm`]). This runs before any key is used,
//!    so a token signed with a different algorithm never reaches verification.
//! 3. The signature must verify ([`AuthError::InvalidSignature`]).
//! 4. `exp` must be present ([`AuthError::MissingExpField`]) and in the future
//!    ([`AuthError::ExpiredToken`]).
//! 5. `iat` must not be in the future and `nbf` must have passed.
//! 6. `iss`, `sub` and `jti` must be non-empty strings ([`AuthError::MissingClaim`]).
//!
//! Only HMAC algorithms are supported since the key is a shared secret.
//!
//! # Example
//!
//! ```ignore
//! use warden_auth::{JwtCodec, TokenValidator};
//! use warden_config::JwtConfig;
//!
//! let codec = JwtCodec::new(&JwtConfig::from_env())?;
//! let issued = codec.issue("google", "jane@example.com", "1234567890", 3600)?;
//!
//! let claims = codec.validate(&issued.token)?;
//! assert_eq!(claims.subject, "jane@example.com");
//! ```

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
};
use serde::Serialize;
use utoipa::ToSchema;

use warden_config::JwtConfig;

use crate::claims::{IssuedClaims, RawClaims, TokenClaims};
use crate::error::{AuthError, SetupError};

/// Verifies a bearer token and returns its claims.
pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

/// A signed token ready to hand to a client.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IssuedToken {
    /// Always `Bearer`
    #[serde(rename = "type")]
    pub token_type: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// HMAC keys and validation settings for one configured algorithm.
#[derive(Clone)]
pub struct JwtCodec {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtCodec")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl JwtCodec {
    /// Builds a codec from configuration.
    ///
    /// # Errors
    ///
    /// - [`SetupError::UnsupportedAlgorithm`] if the algorithm is not `HS256`, `HS384` or `HS512`
    /// - [`SetupError::EmptySecret`] if the secret is empty
    pub fn new(config: &JwtConfig) -> Result<Self, SetupError> {
        let algorithm = Algorithm::from_str(config.algorithm.trim())
            .ok()
            .filter(|alg| matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512))
            .ok_or_else(|| SetupError::UnsupportedAlgorithm(config.algorithm.clone()))?;

        if config.secret.is_empty() {
            return Err(SetupError::EmptySecret);
        }

        // Time-based claims are checked by hand so that a missing `exp` gets
        // its own error instead of jsonwebtoken's generic one.
        let mut validation = Validation::new(algorithm);
        validation.required_spec_claims = HashSet::new();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Signs a token for a federated identity.
    ///
    /// # Arguments
    ///
    /// * `issuer` - Federation provider name, stored as `iss`
    /// * `subject` - User email, stored as `sub`
    /// * `token_id` - User id at the provider, stored as `jti`
    /// * `ttl_seconds` - Lifetime of the token
    ///
    /// # Errors
    ///
    /// Returns the underlying encoding error if signing fails.
    pub fn issue(
        &self,
        issuer: &str,
        subject: &str,
        token_id: &str,
        ttl_seconds: i64,
    ) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(ttl_seconds);

        let claims = IssuedClaims {
            iss: issuer.to_string(),
            sub: subject.to_string(),
            jti: token_id.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?;

        Ok(IssuedToken {
            token_type: "Bearer".to_string(),
            token,
            expires_at,
        })
    }
}

impl TokenValidator for JwtCodec {
    fn validate(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
        if header.alg != self.algorithm {
            return Err(AuthError::InvalidSigningAlgorithm);
        }

        let data = decode::<RawClaims>(token, &self.decoding_key, &self.validation).map_err(
            |err| match err.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    AuthError::InvalidSigningAlgorithm
                }
                _ => AuthError::MalformedToken,
            },
        )?;

        check_claims(data.claims, Utc::now().timestamp())
    }
}

/// Applies the time and identity checks to decoded claims.
pub(crate) fn check_claims(raw: RawClaims, now: i64) -> Result<TokenClaims, AuthError> {
    let now_f = now as f64;

    let exp = raw.exp.ok_or(AuthError::MissingExpField)?;
    if now_f >= exp {
        return Err(AuthError::ExpiredToken);
    }
    if raw.iat.is_some_and(|iat| iat > now_f) {
        return Err(AuthError::TokenUsedBeforeIssued);
    }
    if raw.nbf.is_some_and(|nbf| now_f < nbf) {
        return Err(AuthError::TokenNotValidYet);
    }

    Ok(TokenClaims {
        issuer: required(raw.iss, "iss")?,
        subject: required(raw.sub, "sub")?,
        token_id: required(raw.jti, "jti")?,
        expires_at: exp as i64,
        issued_at: raw.iat.map(|v| v as i64),
        not_before: raw.nbf.map(|v| v as i64),
        audience: raw.aud,
        algorithm: raw.alg,
    })
}

fn required(value: Option<String>, claim: &'static str) -> Result<String, AuthError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingClaim(claim))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::Audience;
    use serde_json::{Value, json};

    const SECRET: &str = "test-secret";

    fn codec() -> JwtCodec {
        JwtCodec::new(&JwtConfig {
            secret: SECRET.into(),
            algorithm: "HS256".into(),
            access_token_expiry: 3600,
        })
        .unwrap()
    }

    fn sign(alg: Algorithm, secret: &str, claims: &Value) -> String {
        encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn valid_claims() -> Value {
        let now = Utc::now().timestamp();
        json!({
            "iss": "google",
            "sub": "jane@example.com",
            "jti": "109876",
            "iat": now,
            "nbf": now,
            "exp": now + 600,
        })
    }

    #[test]
    fn issued_token_validates() {
        let codec = codec();
        let issued = codec
            .issue("google", "jane@example.com", "109876", 600)
            .unwrap();

        assert_eq!(issued.token_type, "Bearer");
        let claims = codec.validate(&issued.token).unwrap();
        assert_eq!(claims.issuer, "google");
        assert_eq!(claims.subject, "jane@example.com");
        assert_eq!(claims.token_id, "109876");
        assert_eq!(claims.expires_at, issued.expires_at.timestamp());
    }

    #[test]
    fn algorithm_mismatch_is_rejected_even_with_valid_signature() {
        let token = sign(Algorithm::HS512, SECRET, &valid_claims());
        assert_eq!(
            codec().validate(&token),
            Err(AuthError::InvalidSigningAlgorithm)
        );
    }

    #[test]
    fn wrong_secret_fails_signature() {
        let token = sign(Algorithm::HS256, "another-secret", &valid_claims());
        assert_eq!(codec().validate(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn missing_exp_has_its_own_reason() {
        let mut claims = valid_claims();
        claims.as_object_mut().unwrap().remove("exp");
        let token = sign(Algorithm::HS256, SECRET, &claims);

        assert_eq!(codec().validate(&token), Err(AuthError::MissingExpField));
    }

    #[test]
    fn missing_exp_wins_over_missing_identity_claims() {
        let token = sign(Algorithm::HS256, SECRET, &json!({ "sub": "x" }));
        assert_eq!(codec().validate(&token), Err(AuthError::MissingExpField));
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut claims = valid_claims();
        claims["exp"] = json!(Utc::now().timestamp() - 10);
        let token = sign(Algorithm::HS256, SECRET, &claims);

        assert_eq!(codec().validate(&token), Err(AuthError::ExpiredToken));
    }

    #[test]
    fn garbage_is_malformed() {
        for token in ["", "abc", "a.b.c", "not-a-token.at-all"] {
            assert_eq!(
                codec().validate(token),
                Err(AuthError::MalformedToken),
                "token {token:?}"
            );
        }
    }

    #[test]
    fn missing_identity_claims_are_malformed() {
        for claim in ["iss", "sub", "jti"] {
            let mut claims = valid_claims();
            claims.as_object_mut().unwrap().remove(claim);
            let token = sign(Algorithm::HS256, SECRET, &claims);

            let err = codec().validate(&token).unwrap_err();
            assert_eq!(err, AuthError::MissingClaim(claim));
            assert!(err.is_malformed());
        }
    }

    #[test]
    fn audience_and_alg_are_carried_through() {
        let mut claims = valid_claims();
        claims["aud"] = json!(["api", "web"]);
        claims["alg"] = json!("HS256");
        let token = sign(Algorithm::HS256, SECRET, &claims);

        let claims = codec().validate(&token).unwrap();
        assert_eq!(
            claims.audience,
            Some(Audience::Multiple(vec!["api".into(), "web".into()]))
        );
        assert_eq!(claims.algorithm.as_deref(), Some("HS256"));
    }

    #[test]
    fn time_checks_use_numeric_comparison() {
        let raw = |exp: f64, iat: Option<f64>, nbf: Option<f64>| RawClaims {
            iss: Some("github".into()),
            sub: Some("a@b.c".into()),
            jti: Some("1".into()),
            exp: Some(exp),
            iat,
            nbf,
            ..RawClaims::default()
        };

        assert!(check_claims(raw(101.0, None, None), 100).is_ok());
        assert_eq!(
            check_claims(raw(100.0, None, None), 100),
            Err(AuthError::ExpiredToken)
        );
        assert_eq!(
            check_claims(raw(200.0, Some(150.0), None), 100),
            Err(AuthError::TokenUsedBeforeIssued)
        );
        assert_eq!(
            check_claims(raw(200.0, None, Some(100.5)), 100),
            Err(AuthError::TokenNotValidYet)
        );
    }

    #[test]
    fn empty_identity_claim_counts_as_missing() {
        let raw = RawClaims {
            iss: Some(String::new()),
            sub: Some("a@b.c".into()),
            jti: Some("1".into()),
            exp: Some(200.0),
            ..RawClaims::default()
        };
        assert_eq!(
            check_claims(raw, 100),
            Err(AuthError::MissingClaim("iss"))
        );
    }

    #[test]
    fn only_hmac_algorithms_are_accepted() {
        for alg in ["RS256", "none", "HS1024", ""] {
            let config = JwtConfig {
                algorithm: alg.into(),
                ..JwtConfig::default()
            };
            assert_eq!(
                JwtCodec::new(&config).unwrap_err(),
                SetupError::UnsupportedAlgorithm(alg.into())
            );
        }

        let config = JwtConfig {
            secret: String::new(),
            ..JwtConfig::default()
        };
        assert_eq!(JwtCodec::new(&config).unwrap_err(), SetupError::EmptySecret);
    }
}
