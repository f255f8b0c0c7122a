//! User models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use warden_auth::Identity;

use crate::roles::RoleInfo;

/// A user row. Soft-deleted users are never loaded.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a user from the CLI.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Name of a role to assign, e.g. `admin`
    pub role: Option<String>,
}

/// DTO for updating a user's names.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(length(min = 1, max = 255, message = "first_name must be 1-255 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 255, message = "last_name must be 1-255 characters"))]
    pub last_name: Option<String>,
}

/// The authenticated caller as returned by `GET /api/me`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct CurrentUserResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub roles: Vec<RoleInfo>,
    pub permissions: Vec<String>,
}

impl From<&Identity> for CurrentUserResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            email: identity.email.clone(),
            display_name: identity.display_name(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            roles: identity
                .roles
                .iter()
                .map(|role| RoleInfo {
                    id: role.id,
                    name: role.name.clone(),
                })
                .collect(),
            permissions: identity.permissions.iter().cloned().collect(),
        }
    }
}
