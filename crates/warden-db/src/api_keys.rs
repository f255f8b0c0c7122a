//! User API keys.

use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use warden_core::generate_api_key;
use warden_models::UserApiKey;

use crate::error::RepoError;

const KEY_COLUMNS: &str = "id, user_id, name, api_key, created_at, updated_at, deleted_at";

/// Generates and stores a new key for `user_id`.
#[instrument(skip(db))]
pub async fn create_api_key(
    db: &PgPool,
    user_id: Uuid,
    name: Option<&str>,
) -> Result<UserApiKey, RepoError> {
    let api_key =
        generate_api_key(&user_id).map_err(|e| RepoError::KeyGeneration(e.error.to_string()))?;

    let key = sqlx::query_as::<_, UserApiKey>(&format!(
        r#"
        INSERT INTO user_api_keys (user_id, name, api_key)
        VALUES ($1, $2, $3)
        RETURNING {KEY_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(name)
    .bind(&api_key)
    .fetch_one(db)
    .await?;

    info!(user_id = %user_id, key_id = key.id, "API key created");
    Ok(key)
}

/// Active keys of a user, newest first.
#[instrument(skip(db))]
pub async fn list_api_keys(db: &PgPool, user_id: Uuid) -> Result<Vec<UserApiKey>, RepoError> {
    let keys = sqlx::query_as::<_, UserApiKey>(&format!(
        r#"
        SELECT {KEY_COLUMNS}
        FROM user_api_keys
        WHERE user_id = $1 AND deleted_at IS NULL
        ORDER BY created_at DESC, id DESC
        "#
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(keys)
}

/// Soft-deletes a key. Returns false when the user has no such active key.
#[instrument(skip(db))]
pub async fn revoke_api_key(db: &PgPool, user_id: Uuid, key_id: i32) -> Result<bool, RepoError> {
    let revoked = sqlx::query(
        r#"
        UPDATE user_api_keys
        SET deleted_at = NOW(), updated_at = NOW()
        WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
        "#,
    )
    .bind(key_id)
    .bind(user_id)
    .execute(db)
    .await?
    .rows_affected();

    if revoked > 0 {
        info!(user_id = %user_id, key_id, "API key revoked");
    }
    Ok(revoked > 0)
}
