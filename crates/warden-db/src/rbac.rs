//! Seeding of the system roles and the permission catalogue.

use std::collections::HashMap;

use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use warden_core::permissions::{
    ADMIN_ROLE, SYSTEM_ROLES, USER_ROLE, actions, default_user_permission_tags, entities,
    format_permission_description, format_permission_tag,
};
use warden_models::Role;

use crate::error::RepoError;

/// What [`seed_rbac`] wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub roles: usize,
    pub permissions: usize,
}

/// Upserts the system roles and every catalogue permission.
///
/// `admin` is granted every tag and `user` the read/list tags. Safe to run
/// repeatedly.
#[instrument(skip(db))]
pub async fn seed_rbac(db: &PgPool) -> Result<SeedSummary, RepoError> {
    let mut tx = db.begin().await?;

    let mut role_ids = HashMap::new();
    for role in SYSTEM_ROLES {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO roles (name, description)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE
            SET description = EXCLUDED.description, updated_at = NOW()
            RETURNING id
            "#,
        )
        .bind(role.name)
        .bind(role.description)
        .fetch_one(&mut *tx)
        .await?;
        role_ids.insert(role.name, id);
    }

    let mut permission_ids = HashMap::new();
    for entity in entities::ALL {
        for action in actions::ALL {
            let tag = format_permission_tag(action, entity);
            let id = sqlx::query_scalar::<_, i32>(
                r#"
                INSERT INTO permissions (tag, description)
                VALUES ($1, $2)
                ON CONFLICT (tag) DO UPDATE
                SET description = EXCLUDED.description, updated_at = NOW()
                RETURNING id
                "#,
            )
            .bind(&tag)
            .bind(format_permission_description(action, entity))
            .fetch_one(&mut *tx)
            .await?;
            permission_ids.insert(tag, id);
        }
    }

    let grants = [
        (ADMIN_ROLE.name, permission_ids.values().copied().collect::<Vec<_>>()),
        (
            USER_ROLE.name,
            default_user_permission_tags()
                .iter()
                .filter_map(|tag| permission_ids.get(tag).copied())
                .collect(),
        ),
    ];

    for (role_name, permissions) in grants {
        let Some(&role_id) = role_ids.get(role_name) else {
            continue;
        };
        sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id)
            SELECT $1, UNNEST($2::INTEGER[])
            ON CONFLICT (role_id, permission_id) DO NOTHING
            "#,
        )
        .bind(role_id)
        .bind(&permissions)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let summary = SeedSummary {
        roles: role_ids.len(),
        permissions: permission_ids.len(),
    };
    info!(roles = summary.roles, permissions = summary.permissions, "RBAC seeded");
    Ok(summary)
}

#[instrument(skip(db))]
pub async fn find_role_by_name(db: &PgPool, name: &str) -> Result<Option<Role>, RepoError> {
    let role = sqlx::query_as::<_, Role>(
        "SELECT id, name, description, created_at, updated_at FROM roles WHERE name = $1",
    )
    .bind(name)
    .fetch_optional(db)
    .await?;

    Ok(role)
}

/// Assigns the role named `role_name` to a user. Assigning twice is a no-op.
#[instrument(skip(db))]
pub async fn assign_role(db: &PgPool, user_id: Uuid, role_name: &str) -> Result<(), RepoError> {
    let role = find_role_by_name(db, role_name)
        .await?
        .ok_or_else(|| RepoError::UnknownRole(role_name.to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO user_roles (user_id, role_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, role_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(role.id)
    .execute(db)
    .await?;

    Ok(())
}

/// Grants a single permission tag directly to a user.
#[instrument(skip(db))]
pub async fn grant_permission(db: &PgPool, user_id: Uuid, tag: &str) -> Result<(), RepoError> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO user_permissions (user_id, permission_id)
        SELECT $1, p.id FROM permissions p WHERE p.tag = $2
        ON CONFLICT (user_id, permission_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(tag)
    .execute(db)
    .await?
    .rows_affected();

    if inserted == 0 {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM permissions WHERE tag = $1)",
        )
        .bind(tag)
        .fetch_one(db)
        .await?;
        if !exists {
            return Err(RepoError::InvalidLookup(format!("permission [{tag}] does not exist")));
        }
    }

    Ok(())
}
