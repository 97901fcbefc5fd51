//! Server and CORS configuration.

use serde::{Deserialize, Serialize};

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Route namespace every endpoint is mounted under.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Externally reachable base URL, used to build the URLs handed to the
    /// job-handler service (job detail, start, callback, status).
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Root URL of the API: public URL joined with the namespace.
    pub fn root_url(&self) -> String {
        let base = self.public_url.trim_end_matches('/');
        match self.namespace.trim_matches('/') {
            "" => base.to_string(),
            namespace => format!("{base}/{namespace}"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            namespace: default_namespace(),
            public_url: default_public_url(),
            request_timeout_seconds: default_request_timeout(),
            cors: CorsConfig::default(),
        }
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins (use `["*"]` for development only).
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    /// Max age for preflight cache in seconds.
    #[serde(default = "default_max_age")]
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            max_age_seconds: default_max_age(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_namespace() -> String {
    "/stateless/v1".to_string()
}

fn default_public_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout() -> u64 {
    300
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_max_age() -> u64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_url_joins_without_double_slashes() {
        let config = ServerConfig {
            public_url: "https://media.example.com/".to_string(),
            namespace: "/stateless/v1/".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(config.root_url(), "https://media.example.com/stateless/v1");
    }

    #[test]
    fn test_root_url_with_root_namespace() {
        let config = ServerConfig {
            public_url: "https://media.example.com".to_string(),
            namespace: "/".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(config.root_url(), "https://media.example.com");
    }
}
