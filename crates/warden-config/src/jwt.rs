use std::env;

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Algorithm name as written in the JOSE header, e.g. `HS256`.
    pub algorithm: String,
    /// Lifetime in seconds of tokens issued by this service.
    pub access_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: env::var("AUTH_JWT_SECRET").unwrap_or(defaults.secret),
            algorithm: env::var("AUTH_JWT_SIGNING_ALGORITHM")
                .map(|s| s.trim().to_uppercase())
                .unwrap_or(defaults.algorithm),
            access_token_expiry: env::var("AUTH_JWT_EXPIRY_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.access_token_expiry),
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "your-secret-key-change-in-production".to_string(),
            algorithm: "HS256".to_string(),
            access_token_expiry: 3600, // 1 hour
        }
    }
}

// Keeps the secret out of logs and `#[instrument]` spans.
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("algorithm", &self.algorithm)
            .field("access_token_expiry", &self.access_token_expiry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_does_not_leak_secret() {
        let config = JwtConfig {
            secret: "super-secret".into(),
            ..JwtConfig::default()
        };
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("HS256"));
    }
}
