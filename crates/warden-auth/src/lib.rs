//! # Warden Auth
//!
//! The authentication gate and the permission model of the Warden service.
//!
//! This crate provides:
//!
//! - [`lookup`]: parsing of `source:name` credential location lists
//! - [`extractor`]: finding API keys and bearer tokens in a request
//! - [`jwt`]: bearer token validation and issuance
//! - [`claims`]: JWT claim structures
//! - [`resolver`]: the [`IdentityResolver`] seam to the user store
//! - [`authenticator`]: the API key first, bearer token second state machine
//! - [`identity`]: the resolved [`Identity`] and its role/permission checks
//! - [`error`]: the rejection taxonomy
//!
//! The crate is framework-light: it reads request parts and renders its
//! rejection as an axum response, but routing and middleware wiring live in
//! the service crate.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use warden_auth::{Authenticator, CredentialRequest};
//! use warden_config::{AuthConfig, JwtConfig};
//!
//! let authenticator = Authenticator::from_config(
//!     &AuthConfig::from_env(),
//!     &JwtConfig::from_env(),
//!     Arc::new(my_resolver),
//! )?;
//!
//! let request = CredentialRequest::from_parts(&parts, path_params);
//! match authenticator.authenticate(&request).await {
//!     Ok(outcome) => println!("hello {}", outcome.identity.display_name()),
//!     Err(rejection) => return rejection.into_response(),
//! }
//! ```

pub mod authenticator;
pub mod claims;
pub mod error;
pub mod extractor;
pub mod identity;
pub mod jwt;
pub mod lookup;
pub mod resolver;

pub use authenticator::{AuthMethod, Authenticated, Authenticator};
pub use claims::{Audience, TokenClaims};
pub use error::{AccessError, AuthError, AuthErrorResponse, ResolveError, SetupError};
pub use extractor::{CredentialExtractor, CredentialRequest, LookupExtractor};
pub use identity::{Identity, RoleGrant};
pub use jwt::{IssuedToken, JwtCodec, TokenValidator};
pub use lookup::{LookupChain, LookupLocation, LookupSource};
pub use resolver::IdentityResolver;
