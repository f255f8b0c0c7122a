//! Credential lookup configuration for the auth gate.

use std::env;

pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";
pub const DEFAULT_API_KEY_LOOKUP: &str = "param:api_key,query:api_key,cookie:api_key,header:x-api-key";
pub const DEFAULT_TOKEN_LOOKUP: &str = "param:api_key,query:token,cookie:jwt,header:Authorization";
pub const DEFAULT_TOKEN_HEAD_NAME: &str = "Bearer";

/// Where the auth gate looks for credentials.
///
/// Lookups are comma separated `source:name` pairs tried in order. Supported
/// sources are `header`, `query`, `cookie` and `param`.
///
/// # Environment Variables
///
/// - `AUTH_API_KEY_LOOKUP` (default: `param:api_key,query:api_key,cookie:api_key,header:x-api-key`)
/// - `AUTH_TOKEN_LOOKUP` (default: `param:api_key,query:token,cookie:jwt,header:Authorization`)
/// - `AUTH_TOKEN_HEAD_NAME` (default: `Bearer`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthConfig {
    pub api_key_lookup: String,
    pub token_lookup: String,
    pub token_head_name: String,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key_lookup: non_empty_var("AUTH_API_KEY_LOOKUP").unwrap_or(defaults.api_key_lookup),
            token_lookup: non_empty_var("AUTH_TOKEN_LOOKUP").unwrap_or(defaults.token_lookup),
            token_head_name: non_empty_var("AUTH_TOKEN_HEAD_NAME")
                .unwrap_or(defaults.token_head_name),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key_lookup: DEFAULT_API_KEY_LOOKUP.to_string(),
            token_lookup: DEFAULT_TOKEN_LOOKUP.to_string(),
            token_head_name: DEFAULT_TOKEN_HEAD_NAME.to_string(),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
