//! # Warden DB
//!
//! Database pool, migrations and repositories for the Warden service.
//!
//! Repositories are plain async functions over a [`PgPool`]. Lookups that may
//! miss return `Ok(None)`; everything else that goes wrong is a [`RepoError`].
//! Users, their roles and their permissions are loaded together and handed out
//! as a [`warden_auth::Identity`].
//!
//! # Example
//!
//! ```ignore
//! use warden_config::DatabaseConfig;
//! use warden_db::{init_db_pool, run_migrations, users};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()).await?;
//! run_migrations(&pool).await?;
//!
//! if let Some(identity) = users::find_user_by_api_key(&pool, "validkey123").await? {
//!     println!("{} authenticated", identity.email);
//! }
//! ```

pub mod access;
pub mod api_keys;
pub mod error;
pub mod profiles;
pub mod rbac;
pub mod resolver;
pub mod users;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use warden_config::DatabaseConfig;

pub use error::RepoError;
pub use resolver::PgIdentityResolver;
pub use sqlx::PgPool;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Connects a PostgreSQL pool sized by `DB_MAX_CONNECTIONS`.
///
/// The returned pool is cheaply cloneable and is shared through the
/// application state.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    info!(max_connections = config.max_connections, "Database pool ready");
    Ok(pool)
}

/// Applies every pending migration from `./migrations`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// Round-trips a trivial query, for readiness checks.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
