//! # Warden Core
//!
//! Core types, errors, and utilities shared by every Warden crate.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`permissions`]: Permission catalogue and `action:entity` tag helpers
//! - [`api_key`]: API key generation
//!
//! # Example
//!
//! ```ignore
//! use warden_core::errors::AppError;
//! use warden_core::permissions::{self, actions, entities};
//!
//! let error = AppError::not_found(anyhow::anyhow!("User not found"));
//!
//! let tag = permissions::format_permission_tag(actions::CREATE, entities::USERS);
//! assert_eq!(tag, "create:users");
//! ```

pub mod api_key;
pub mod errors;
pub mod permissions;

pub use api_key::generate_api_key;
pub use errors::{AppError, ErrorResponse};
