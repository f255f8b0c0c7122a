//! Request middleware.
//!
//! - [`auth`]: the auth gate ([`auth::require_auth`]) and the extractors that
//!   read what it attached to the request
//!
//! # Authentication Flow
//!
//! 1. `require_auth` looks for an API key, then for a bearer token
//! 2. The credential is resolved to an [`warden_auth::Identity`]
//! 3. The identity is stored in the request extensions as [`auth::CurrentUser`]
//! 4. Handlers take `CurrentUser` (or a `require_permission!` extractor) and
//!    run their own role and permission checks
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::CurrentUser;
//!
//! async fn whoami(user: CurrentUser) -> String {
//!     user.identity.display_name()
//! }
//! ```

pub mod auth;
