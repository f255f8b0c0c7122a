use sqlx::PgPool;

use warden_auth::{IdentityResolver, ResolveError};
use warden_core::permissions::all_permission_tags;
use warden_db::{PgIdentityResolver, RepoError, api_keys, rbac, users};
use warden_db::profiles::upsert_user_profile;
use warden_models::{CreateUserDto, FederatedUser, LOCAL_PROVIDER};

fn user_dto(email: &str, role: Option<&str>) -> CreateUserDto {
    CreateUserDto {
        email: email.to_string(),
        first_name: Some("Test".into()),
        last_name: Some("User".into()),
        role: role.map(str::to_string),
    }
}

fn federated(provider: &str, external_id: &str, email: &str) -> FederatedUser {
    FederatedUser {
        provider: provider.to_string(),
        external_user_id: external_id.to_string(),
        email: email.to_string(),
        first_name: Some("Fed".into()),
        last_name: Some("Erated".into()),
        avatar_url: None,
        description: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_seed_rbac_is_idempotent(pool: PgPool) {
    let first = rbac::seed_rbac(&pool).await.unwrap();
    let second = rbac::seed_rbac(&pool).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.permissions, all_permission_tags().len());

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM permissions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored as usize, first.permissions);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_api_key_resolves_to_identity_with_role_permissions(pool: PgPool) {
    rbac::seed_rbac(&pool).await.unwrap();
    let user = users::create_user(&pool, &user_dto("Jane@Example.com", Some("user")))
        .await
        .unwrap();
    assert_eq!(user.email, "jane@example.com");

    let key = api_keys::create_api_key(&pool, user.id, Some("ci"))
        .await
        .unwrap();

    let identity = users::find_user_by_api_key(&pool, &key.api_key)
        .await
        .unwrap()
        .expect("key should resolve");
    assert_eq!(identity.id, user.id);
    assert!(identity.has_role_named("user"));
    assert!(identity.has_permission_tag("read:users"));
    assert!(!identity.has_permission_tag("delete:users"));

    assert!(users::find_user_by_api_key(&pool, "").await.unwrap().is_none());
    assert!(
        users::find_user_by_api_key(&pool, "unknown")
            .await
            .unwrap()
            .is_none()
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_revoked_api_key_no_longer_resolves(pool: PgPool) {
    rbac::seed_rbac(&pool).await.unwrap();
    let user = users::create_user(&pool, &user_dto("revoke@example.com", None))
        .await
        .unwrap();
    let key = api_keys::create_api_key(&pool, user.id, None).await.unwrap();

    assert!(api_keys::revoke_api_key(&pool, user.id, key.id).await.unwrap());
    assert!(!api_keys::revoke_api_key(&pool, user.id, key.id).await.unwrap());

    assert!(
        users::find_user_by_api_key(&pool, &key.api_key)
            .await
            .unwrap()
            .is_none()
    );
    assert!(api_keys::list_api_keys(&pool, user.id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_direct_grants_join_role_permissions(pool: PgPool) {
    rbac::seed_rbac(&pool).await.unwrap();
    let user = users::create_user(&pool, &user_dto("grant@example.com", Some("user")))
        .await
        .unwrap();
    rbac::grant_permission(&pool, user.id, "delete:users")
        .await
        .unwrap();

    let key = api_keys::create_api_key(&pool, user.id, None).await.unwrap();
    let identity = users::find_user_by_api_key(&pool, &key.api_key)
        .await
        .unwrap()
        .unwrap();

    assert!(identity.has_permission("delete", "Users"));
    assert!(identity.has_permission("list", "Users"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_role_is_rejected(pool: PgPool) {
    rbac::seed_rbac(&pool).await.unwrap();
    let err = users::create_user(&pool, &user_dto("role@example.com", Some("wizard")))
        .await
        .unwrap_err();

    assert!(matches!(err, RepoError::UnknownRole(name) if name == "wizard"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_email_is_conflict(pool: PgPool) {
    users::create_user(&pool, &user_dto("dup@example.com", None))
        .await
        .unwrap();
    let err = users::create_user(&pool, &user_dto("DUP@example.com", None))
        .await
        .unwrap_err();

    assert!(matches!(err, RepoError::Conflict(_)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_federated_profile_resolves_by_claims(pool: PgPool) {
    rbac::seed_rbac(&pool).await.unwrap();

    let imported = upsert_user_profile(&pool, federated("google", "g-42", " Fed@Example.com "))
        .await
        .unwrap();
    assert!(imported.created);
    assert_eq!(imported.profile.email, "fed@example.com");

    let again = upsert_user_profile(&pool, federated("google", "g-42", "fed@example.com"))
        .await
        .unwrap();
    assert!(!again.created);
    assert_eq!(again.user.id, imported.user.id);

    let identity = users::find_user_by_jwt(&pool, "fed@example.com", "google", "g-42")
        .await
        .unwrap()
        .expect("profile should resolve");
    assert_eq!(identity.id, imported.user.id);
    assert!(identity.has_role_named("user"));

    assert!(
        users::find_user_by_jwt(&pool, "fed@example.com", "github", "g-42")
            .await
            .unwrap()
            .is_none()
    );
    assert!(matches!(
        users::find_user_by_jwt(&pool, "fed@example.com", "", "g-42").await,
        Err(RepoError::InvalidLookup(_))
    ));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_empty_provider_defaults_to_local(pool: PgPool) {
    rbac::seed_rbac(&pool).await.unwrap();

    let imported = upsert_user_profile(&pool, federated("", "local-1", "local@example.com"))
        .await
        .unwrap();

    assert_eq!(imported.profile.provider, LOCAL_PROVIDER);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_resolver_maps_repository_outcomes(pool: PgPool) {
    rbac::seed_rbac(&pool).await.unwrap();
    let resolver = PgIdentityResolver::new(pool.clone());

    assert!(matches!(
        resolver.resolve_by_api_key("missing").await,
        Err(ResolveError::NotFound)
    ));
    assert!(matches!(
        resolver.resolve_by_claims("a@example.com", "", "x").await,
        Err(ResolveError::InvalidLookup(_))
    ));

    let imported = upsert_user_profile(&pool, federated("google", "g-7", "r@example.com"))
        .await
        .unwrap();
    let identity = resolver
        .resolve_by_claims("r@example.com", "google", "g-7")
        .await
        .unwrap();
    assert_eq!(identity.id, imported.user.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_users_pages_and_clear_users_deletes(pool: PgPool) {
    for i in 0..3 {
        users::create_user(&pool, &user_dto(&format!("u{}@example.com", i), None))
            .await
            .unwrap();
    }

    assert_eq!(users::list_users(&pool, 2, 0).await.unwrap().len(), 2);
    assert_eq!(users::list_users(&pool, 2, 2).await.unwrap().len(), 1);

    assert_eq!(users::clear_users(&pool).await.unwrap(), 3);
    assert!(users::list_users(&pool, 10, 0).await.unwrap().is_empty());
}
