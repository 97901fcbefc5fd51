//! Service-account key loading and validation.

use serde::Deserialize;

use stateless_core::config::StorageConfig;
use stateless_core::error::AppError;
use stateless_core::result::AppResult;

/// Default OAuth token endpoint used when the key omits `token_uri`.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The fields of a service-account key JSON the clients rely on.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Account email, used as the JWT issuer.
    #[serde(default)]
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// OAuth token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    /// Owning project, if present.
    #[serde(default)]
    pub project_id: Option<String>,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"****")
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .finish()
    }
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Validate the bucket and load the key from `key_json`, falling back
    /// to reading `key_file`.
    pub fn from_config(config: &StorageConfig) -> AppResult<Self> {
        if config.bucket.trim().is_empty() {
            return Err(AppError::configuration("Bucket parameter must be provided."));
        }

        let raw = if !config.key_json.trim().is_empty() {
            config.key_json.clone()
        } else if !config.key_file.trim().is_empty() {
            std::fs::read_to_string(&config.key_file).map_err(|e| {
                AppError::configuration(format!(
                    "Failed to read service account key file '{}': {e}",
                    config.key_file
                ))
            })?
        } else {
            return Err(AppError::configuration("Service Account JSON is invalid."));
        };

        Self::parse(&raw)
    }

    /// Parse a key JSON document; it must carry a non-empty `private_key`.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let invalid = || AppError::configuration("Service Account JSON is invalid.");

        let value: serde_json::Value = serde_json::from_str(raw).map_err(|_| invalid())?;
        let has_key = value
            .get("private_key")
            .and_then(|k| k.as_str())
            .is_some_and(|k| !k.is_empty());
        if !has_key {
            return Err(invalid());
        }

        serde_json::from_value(value).map_err(|_| invalid())
    }
}
