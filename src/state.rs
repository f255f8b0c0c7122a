use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;
use tracing::info;

use warden_auth::{Authenticator, IdentityResolver, JwtCodec, SetupError};
use warden_cache::RedisCache;
use warden_config::{AuthConfig, CacheConfig, CorsConfig, DatabaseConfig, JwtConfig, ServerConfig};
use warden_db::{PgIdentityResolver, init_db_pool, rbac::seed_rbac, run_migrations};

/// Every configuration section, loaded once at startup.
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub jwt: JwtConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub cors: CorsConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            auth: AuthConfig::from_env(),
            jwt: JwtConfig::from_env(),
            database: DatabaseConfig::from_env(),
            cache: CacheConfig::from_env(),
            cors: CorsConfig::from_env(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub authenticator: Authenticator,
    pub jwt: JwtCodec,
    pub server_config: ServerConfig,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub cache: Option<RedisCache>,
}

impl AppState {
    /// Builds the state around an existing pool and identity resolver.
    ///
    /// # Errors
    ///
    /// Fails when a credential lookup string, the signing algorithm or the
    /// secret is unusable.
    pub fn new(
        db: PgPool,
        resolver: Arc<dyn IdentityResolver>,
        config: &AppConfig,
        cache: Option<RedisCache>,
    ) -> Result<Self, SetupError> {
        Ok(Self {
            db,
            authenticator: Authenticator::from_config(&config.auth, &config.jwt, resolver)?,
            jwt: JwtCodec::new(&config.jwt)?,
            server_config: config.server.clone(),
            jwt_config: config.jwt.clone(),
            cors_config: config.cors.clone(),
            cache,
        })
    }
}

/// Connects the database (and Redis when enabled), applies migrations and
/// seeds as configured, and wires the Postgres identity resolver.
pub async fn init_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let db = init_db_pool(&config.database)
        .await
        .context("Failed to connect to database")?;

    if config.database.auto_migrate {
        run_migrations(&db)
            .await
            .context("Failed to run database migrations")?;
    }

    if config.database.seed {
        seed_rbac(&db)
            .await
            .context("Failed to seed roles and permissions")?;
    }

    let cache = if config.cache.enabled {
        let cache = RedisCache::connect(&config.cache)
            .await
            .context("Failed to connect to Redis")?;
        info!("Redis cache connected");
        Some(cache)
    } else {
        None
    };

    let resolver = Arc::new(PgIdentityResolver::new(db.clone()));
    AppState::new(db, resolver, config, cache).context("Invalid auth configuration")
}
