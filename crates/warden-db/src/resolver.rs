use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use warden_auth::{Identity, IdentityResolver, ResolveError};

use crate::error::RepoError;
use crate::users::{find_user_by_api_key, find_user_by_jwt};

/// [`IdentityResolver`] backed by the Postgres user store.
#[derive(Clone)]
pub struct PgIdentityResolver {
    db: PgPool,
}

impl PgIdentityResolver {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn resolve_error(e: RepoError) -> ResolveError {
    match e {
        RepoError::InvalidLookup(reason) => ResolveError::InvalidLookup(reason),
        other => ResolveError::storage(other),
    }
}

#[async_trait]
impl IdentityResolver for PgIdentityResolver {
    #[instrument(skip(self, api_key))]
    async fn resolve_by_api_key(&self, api_key: &str) -> Result<Identity, ResolveError> {
        find_user_by_api_key(&self.db, api_key)
            .await
            .map_err(resolve_error)?
            .ok_or(ResolveError::NotFound)
    }

    #[instrument(skip(self))]
    async fn resolve_by_claims(
        &self,
        email: &str,
        issuer: &str,
        subject_id: &str,
    ) -> Result<Identity, ResolveError> {
        find_user_by_jwt(&self.db, email, issuer, subject_id)
            .await
            .map_err(resolve_error)?
            .ok_or(ResolveError::NotFound)
    }
}
