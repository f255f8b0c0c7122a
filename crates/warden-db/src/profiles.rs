//! Import of federated (OAuth) profiles.

use sqlx::PgPool;
use tracing::{info, instrument};
use validator::Validate;

use warden_core::permissions::USER_ROLE;
use warden_models::{FederatedUser, User, UserProfile};

use crate::error::RepoError;

/// Outcome of [`upsert_user_profile`].
#[derive(Debug, Clone)]
pub struct ImportedProfile {
    pub user: User,
    pub profile: UserProfile,
    /// True when the local user did not exist before.
    pub created: bool,
}

/// Creates or updates the local user and the profile for a federated user.
///
/// The email is lowercased. Email and external user id are required. New
/// users receive the `user` role when it has been seeded.
#[instrument(skip(db, federated), fields(provider = %federated.provider))]
pub async fn upsert_user_profile(
    db: &PgPool,
    federated: FederatedUser,
) -> Result<ImportedProfile, RepoError> {
    let federated = federated.normalized();
    federated.validate()?;

    let mut tx = db.begin().await?;

    let existing = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            updated_at = NOW()
        WHERE email = $1 AND deleted_at IS NULL
        RETURNING id, email, first_name, last_name, created_at, updated_at
        "#,
    )
    .bind(&federated.email)
    .bind(&federated.first_name)
    .bind(&federated.last_name)
    .fetch_optional(&mut *tx)
    .await?;

    let (user, created) = match existing {
        Some(user) => (user, false),
        None => {
            let user = sqlx::query_as::<_, User>(
                r#"
                INSERT INTO users (email, first_name, last_name)
                VALUES ($1, $2, $3)
                RETURNING id, email, first_name, last_name, created_at, updated_at
                "#,
            )
            .bind(&federated.email)
            .bind(&federated.first_name)
            .bind(&federated.last_name)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role_id)
                SELECT $1, r.id FROM roles r WHERE r.name = $2
                ON CONFLICT (user_id, role_id) DO NOTHING
                "#,
            )
            .bind(user.id)
            .bind(USER_ROLE.name)
            .execute(&mut *tx)
            .await?;

            (user, true)
        }
    };

    let profile = sqlx::query_as::<_, UserProfile>(
        r#"
        INSERT INTO user_profiles
            (user_id, email, provider, external_user_id, first_name, last_name, avatar_url, description)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (email, provider, external_user_id) DO UPDATE
        SET user_id = EXCLUDED.user_id,
            first_name = EXCLUDED.first_name,
            last_name = EXCLUDED.last_name,
            avatar_url = EXCLUDED.avatar_url,
            description = EXCLUDED.description,
            updated_at = NOW()
        RETURNING id, user_id, email, provider, external_user_id, first_name, last_name,
                  avatar_url, description, created_at, updated_at
        "#,
    )
    .bind(user.id)
    .bind(&federated.email)
    .bind(&federated.provider)
    .bind(&federated.external_user_id)
    .bind(&federated.first_name)
    .bind(&federated.last_name)
    .bind(&federated.avatar_url)
    .bind(&federated.description)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(user_id = %user.id, created, "Federated profile imported");
    Ok(ImportedProfile {
        user,
        profile,
        created,
    })
}
