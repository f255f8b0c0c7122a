//! Federated (OAuth) profiles.
//!
//! A [`FederatedUser`] is what an identity provider hands back after the
//! OAuth handshake. Importing it creates or updates the local user and the
//! [`UserProfile`] keyed by `(email, provider, external_user_id)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Provider name used for profiles that did not come from federation.
pub const LOCAL_PROVIDER: &str = "DB";

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct UserProfile {
    pub id: i32,
    pub user_id: Uuid,
    pub email: String,
    pub provider: String,
    pub external_user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user as returned by an identity provider.
#[derive(Deserialize, Serialize, Debug, Clone, Validate, ToSchema)]
pub struct FederatedUser {
    #[validate(length(min = 1, message = "field [Provider] is required"))]
    pub provider: String,
    #[validate(length(min = 1, max = 255, message = "field [UserID] is required"))]
    pub external_user_id: String,
    #[validate(email(message = "field [Email] is required"))]
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(length(max = 1024))]
    pub avatar_url: Option<String>,
    #[validate(length(max = 1024))]
    pub description: Option<String>,
}

impl FederatedUser {
    /// Lowercases the email and falls back to [`LOCAL_PROVIDER`] when no
    /// provider is set.
    pub fn normalized(mut self) -> Self {
        self.email = self.email.trim().to_lowercase();
        self.provider = self.provider.trim().to_string();
        if self.provider.is_empty() {
            self.provider = LOCAL_PROVIDER.to_string();
        }
        self.external_user_id = self.external_user_id.trim().to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn federated() -> FederatedUser {
        FederatedUser {
            provider: "google".into(),
            external_user_id: "10769150350006150715113082367".into(),
            email: " Jane.Doe@Example.com ".into(),
            first_name: Some("Jane".into()),
            last_name: Some("Doe".into()),
            avatar_url: None,
            description: None,
        }
    }

    #[test]
    fn normalized_lowercases_email() {
        let user = federated().normalized();
        assert_eq!(user.email, "jane.doe@example.com");
        assert!(user.validate().is_ok());
    }

    #[test]
    fn empty_provider_becomes_local() {
        let user = FederatedUser {
            provider: "  ".into(),
            ..federated()
        }
        .normalized();
        assert_eq!(user.provider, LOCAL_PROVIDER);
    }

    #[test]
    fn external_user_id_is_required() {
        let user = FederatedUser {
            external_user_id: String::new(),
            ..federated()
        }
        .normalized();
        let errors = user.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("external_user_id"));
    }

    #[test]
    fn email_is_required() {
        let user = FederatedUser {
            email: String::new(),
            ..federated()
        }
        .normalized();
        let errors = user.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }
}
