use async_trait::async_trait;

use crate::error::ResolveError;
use crate::identity::Identity;

/// Maps a credential to the identity it belongs to.
///
/// Implementations return the identity with roles and permissions loaded.
/// A missing match is [`ResolveError::NotFound`]; a failing backend is
/// [`ResolveError::Storage`]. Lookups are not retried.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Finds the owner of an API key. An empty key never matches.
    async fn resolve_by_api_key(&self, api_key: &str) -> Result<Identity, ResolveError>;

    /// Finds the user behind a federated profile.
    ///
    /// `issuer` is the federation provider and `subject_id` the user id at
    /// that provider; both must be non-empty.
    async fn resolve_by_claims(
        &self,
        email: &str,
        issuer: &str,
        subject_id: &str,
    ) -> Result<Identity, ResolveError>;
}
