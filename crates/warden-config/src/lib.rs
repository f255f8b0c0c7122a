//! # Warden Config
//!
//! Configuration types for the Warden service, loaded from environment
//! variables. Every type also implements [`Default`] with the same values
//! `from_env` falls back to, which keeps tests independent of the process
//! environment.
//!
//! - [`server`]: listen address and versioned endpoint helpers
//! - [`jwt`]: token signing secret, algorithm and lifetime
//! - [`auth`]: credential lookup locations for the auth gate
//! - [`database`]: Postgres connection settings
//! - [`cache`]: Redis settings
//! - [`cors`]: allowed origins
//!
//! # Example
//!
//! ```ignore
//! use warden_config::{AuthConfig, JwtConfig, ServerConfig};
//!
//! let server = ServerConfig::from_env();
//! let jwt = JwtConfig::from_env();
//! let auth = AuthConfig::from_env();
//!
//! println!("listening on {}", server.listen_endpoint());
//! ```

pub mod auth;
pub mod cache;
pub mod cors;
pub mod database;
pub mod jwt;
pub mod server;

pub use auth::AuthConfig;
pub use cache::CacheConfig;
pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;

/// Parses boolean flags the way operators tend to write them.
pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_flag;

    #[test]
    fn flags() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
