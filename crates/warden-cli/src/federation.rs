//! Post-handshake federation.
//!
//! Once an identity provider has vouched for a user, the profile is stored
//! and a bearer token is issued whose `iss`, `sub` and `jti` claims point
//! back at that profile, so the auth gate can resolve it on later requests.

use sqlx::PgPool;

use warden_auth::{IssuedToken, JwtCodec};
use warden_db::profiles::{ImportedProfile, upsert_user_profile};
use warden_models::FederatedUser;

#[derive(Debug)]
pub struct FederatedLogin {
    pub imported: ImportedProfile,
    pub token: IssuedToken,
}

/// Upserts the profile and issues a token valid for `ttl_seconds`.
pub async fn import_profile(
    db: &PgPool,
    codec: &JwtCodec,
    federated: FederatedUser,
    ttl_seconds: i64,
) -> anyhow::Result<FederatedLogin> {
    let imported = upsert_user_profile(db, federated).await?;

    let token = codec.issue(
        &imported.profile.provider,
        &imported.profile.email,
        &imported.profile.external_user_id,
        ttl_seconds,
    )?;

    Ok(FederatedLogin { imported, token })
}
