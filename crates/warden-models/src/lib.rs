//! # Warden Models
//!
//! Database entities and request/response DTOs for the Warden service.
//!
//! # Modules
//!
//! - [`users`]: users and the current-user view
//! - [`roles`]: roles and permissions
//! - [`profiles`]: federated (OAuth) profiles
//! - [`api_keys`]: user API keys
//! - [`pagination`]: list query parameters
//!
//! # Example
//!
//! ```ignore
//! use warden_models::users::{CurrentUserResponse, UpdateUserDto};
//! use warden_models::profiles::FederatedUser;
//!
//! let me = CurrentUserResponse::from(&identity);
//! ```

pub mod api_keys;
pub mod pagination;
pub mod profiles;
pub mod roles;
pub mod users;

pub use api_keys::{ApiKeySummary, CreateApiKeyDto, CreatedApiKey, UserApiKey};
pub use pagination::PaginationParams;
pub use profiles::{FederatedUser, LOCAL_PROVIDER, UserProfile};
pub use roles::{Permission, Role, RoleInfo};
pub use users::{CreateUserDto, CurrentUserResponse, UpdateUserDto, User};
