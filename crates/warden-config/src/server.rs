use std::env;

/// HTTP server settings.
///
/// # Environment Variables
///
/// - `SERVICE_NAME` (default: `warden`)
/// - `APP_ENV` (default: `development`)
/// - `SERVER_HOST` (default: `0.0.0.0`)
/// - `SERVER_PORT` (default: `7777`)
/// - `SERVER_URI_SCHEMA` (default: `http://`)
/// - `SERVER_PATH_VERSION` (default: `v1`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub service_name: String,
    pub environment: String,
    pub host: String,
    pub port: String,
    pub uri_schema: String,
    pub path_version: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            service_name: env::var("SERVICE_NAME").unwrap_or(defaults.service_name),
            environment: env::var("APP_ENV").unwrap_or(defaults.environment),
            host: env::var("SERVER_HOST").unwrap_or(defaults.host),
            port: env::var("SERVER_PORT").unwrap_or(defaults.port),
            uri_schema: env::var("SERVER_URI_SCHEMA").unwrap_or(defaults.uri_schema),
            path_version: env::var("SERVER_PATH_VERSION")
                .map(|v| v.trim_matches('/').to_string())
                .unwrap_or(defaults.path_version),
        }
    }

    /// Address handed to the TCP listener.
    pub fn listen_endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Prefixes `path` with the API version, `/v1` when none is configured.
    pub fn versioned_endpoint(&self, path: &str) -> String {
        if self.path_version.is_empty() {
            format!("/v1{}", path)
        } else {
            format!("/{}{}", self.path_version, path)
        }
    }

    /// Absolute URL of a versioned endpoint, as advertised to clients.
    pub fn schema_versioned_endpoint(&self, path: &str) -> String {
        let host = match self.host.as_str() {
            "" | ":" | "0.0.0.0" => "localhost",
            host => host,
        };
        let versioned = self.versioned_endpoint(path);

        if self.port == "80" {
            format!("{}{}{}", self.uri_schema, host, versioned)
        } else {
            format!("{}{}:{}{}", self.uri_schema, host, self.port, versioned)
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            service_name: "warden".into(),
            environment: "development".into(),
            host: "0.0.0.0".into(),
            port: "7777".into(),
            uri_schema: "http://".into(),
            path_version: "v1".into(),
        }
    }
}
