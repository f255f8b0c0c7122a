//! Eager loading of a user's roles and effective permissions.

use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use warden_auth::Identity;
use warden_models::{RoleInfo, User};

use crate::error::RepoError;

/// Roles assigned to a user.
#[instrument(skip(db))]
pub async fn find_user_roles(db: &PgPool, user_id: Uuid) -> Result<Vec<RoleInfo>, RepoError> {
    let roles = sqlx::query_as::<_, RoleInfo>(
        r#"
        SELECT r.id, r.name
        FROM roles r
        JOIN user_roles ur ON ur.role_id = r.id
        WHERE ur.user_id = $1
        ORDER BY r.id
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(roles)
}

/// Direct grants plus every grant of the user's roles.
#[instrument(skip(db))]
pub async fn find_effective_permissions(
    db: &PgPool,
    user_id: Uuid,
) -> Result<Vec<String>, RepoError> {
    let tags = sqlx::query_scalar::<_, String>(
        r#"
        SELECT p.tag
        FROM permissions p
        JOIN user_permissions up ON up.permission_id = p.id
        WHERE up.user_id = $1
        UNION
        SELECT p.tag
        FROM permissions p
        JOIN role_permissions rp ON rp.permission_id = p.id
        JOIN user_roles ur ON ur.role_id = rp.role_id
        WHERE ur.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(tags)
}

/// Builds the [`Identity`] of `user` with roles and permissions loaded.
pub async fn load_identity(db: &PgPool, user: User) -> Result<Identity, RepoError> {
    let roles = find_user_roles(db, user.id).await?;
    let permissions = find_effective_permissions(db, user.id).await?;

    let identity = roles.into_iter().fold(
        Identity::new(user.id, user.email).with_names(user.first_name, user.last_name),
        |identity, role| identity.with_role(role.id, role.name),
    );

    Ok(permissions
        .into_iter()
        .fold(identity, |identity, tag| identity.with_permission(tag)))
}
