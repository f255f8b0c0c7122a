//! User API key models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Number of leading key characters shown in listings.
pub const API_KEY_PREVIEW_LEN: usize = 8;

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct UserApiKey {
    pub id: i32,
    pub user_id: Uuid,
    pub name: Option<String>,
    pub api_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct CreateApiKeyDto {
    #[validate(length(min = 1, max = 128, message = "name must be 1-128 characters"))]
    pub name: Option<String>,
}

/// Returned once, when the key is created. The full key is never shown again.
#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct CreatedApiKey {
    pub id: i32,
    pub name: Option<String>,
    pub api_key: String,
    pub created_at: DateTime<Utc>,
}

/// A listed key with only its first characters visible.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct ApiKeySummary {
    pub id: i32,
    pub name: Option<String>,
    pub preview: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserApiKey> for CreatedApiKey {
    fn from(key: UserApiKey) -> Self {
        Self {
            id: key.id,
            name: key.name,
            api_key: key.api_key,
            created_at: key.created_at,
        }
    }
}

impl From<UserApiKey> for ApiKeySummary {
    fn from(key: UserApiKey) -> Self {
        let preview = key.api_key.chars().take(API_KEY_PREVIEW_LEN).collect();
        Self {
            id: key.id,
            name: key.name,
            preview,
            created_at: key.created_at,
        }
    }
}
