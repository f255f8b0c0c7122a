//! # Warden Cache
//!
//! Redis client for the Warden service.
//!
//! Resolved identities are never cached; every request re-resolves its
//! caller from the database. The cache is used for readiness probes and is
//! only connected when `CACHE_ENABLED` is set.
//!
//! # Example
//!
//! ```ignore
//! use warden_cache::RedisCache;
//! use warden_config::CacheConfig;
//!
//! let cache = RedisCache::connect(&CacheConfig::from_env()).await?;
//! cache.ping().await?;
//! ```

pub mod redis;

pub use redis::{CacheError, RedisCache};
