//! Google Cloud Storage JSON API client.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::StreamExt;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use stateless_core::config::StorageConfig;
use stateless_core::error::{AppError, ErrorKind};
use stateless_core::result::AppResult;
use stateless_core::traits::object_store::{ObjectRecord, ObjectStore, PutObject};

use crate::credentials::ServiceAccountKey;
use crate::naming::encode_object_name;

const API_BASE: &str = "https://storage.googleapis.com";
const SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_write";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Claims of the self-signed assertion exchanged for an access token.
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// [`ObjectStore`] over the Cloud Storage JSON API.
pub struct GcsObjectStore {
    http: Client,
    api_base: String,
    bucket: String,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    token: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for GcsObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcsObjectStore")
            .field("api_base", &self.api_base)
            .field("bucket", &self.bucket)
            .field("key", &self.key)
            .finish()
    }
}

impl GcsObjectStore {
    /// Create a client for the configured bucket.
    pub fn new(config: &StorageConfig, key: ServiceAccountKey) -> AppResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                "Service Account JSON is invalid.",
                e,
            )
        })?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            http,
            api_base: API_BASE.to_string(),
            bucket: config.bucket.clone(),
            key,
            encoding_key,
            token: Mutex::new(None),
        })
    }

    /// Point the client at a different API host (emulators).
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    fn object_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/b/{}/o/{}",
            self.api_base,
            self.bucket,
            encode_object_name(name)
        )
    }

    async fn access_token(&self) -> AppResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + Duration::from_secs(60) {
                return Ok(token.value.clone());
            }
        }

        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + 3600,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to sign token request", e)
            })?;

        let body = format!(
            "grant_type={}&assertion={assertion}",
            encode_object_name(JWT_BEARER_GRANT)
        );
        let response = self
            .http
            .post(&self.key.token_uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response, "token exchange").await?;
        let token: TokenResponse = response.json().await.map_err(transport_error)?;

        debug!(expires_in = token.expires_in, "Obtained storage access token");
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(token.access_token)
    }

    async fn patch_metadata(&self, name: &str, request: &PutObject) -> AppResult<ObjectRecord> {
        let mut patch = serde_json::Map::new();
        patch.insert(
            "metadata".to_string(),
            serde_json::Value::Object(request.metadata.clone()),
        );
        if let Some(cache_control) = &request.cache_control {
            patch.insert("cacheControl".to_string(), cache_control.clone().into());
        }
        if let Some(disposition) = &request.content_disposition {
            patch.insert("contentDisposition".to_string(), disposition.clone().into());
        }

        let token = self.access_token().await?;
        let response = self
            .http
            .patch(self.object_url(name))
            .bearer_auth(token)
            .json(&patch)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response, "metadata update").await?;
        response.json().await.map_err(transport_error)
    }
}

#[async_trait]
impl ObjectStore for GcsObjectStore {
    fn provider_type(&self) -> &str {
        "gcs"
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(&self, request: PutObject) -> AppResult<ObjectRecord> {
        let name = request.object_name();
        let data = fs::read(&request.local_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read '{}' for upload", request.local_path.display()),
                e,
            )
        })?;

        let url = reqwest::Url::parse_with_params(
            &format!("{}/upload/storage/v1/b/{}/o", self.api_base, self.bucket),
            &[("uploadType", "media"), ("name", name.as_str())],
        )
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Invalid upload URL", e))?;

        let token = self.access_token().await?;
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, request.mime_type.as_str())
            .body(data)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response, "upload").await?;
        let record: ObjectRecord = response.json().await.map_err(transport_error)?;

        let needs_patch = !request.metadata.is_empty()
            || request.cache_control.is_some()
            || request.content_disposition.is_some();
        if !needs_patch {
            return Ok(record);
        }
        self.patch_metadata(&name, &request).await
    }

    async fn exists(&self, name: &str) -> AppResult<bool> {
        Ok(self.record(name).await?.is_some())
    }

    async fn record(&self, name: &str) -> AppResult<Option<ObjectRecord>> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(self.object_url(name))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response, "object lookup").await?;
        Ok(Some(response.json().await.map_err(transport_error)?))
    }

    async fn get(&self, name: &str, save_to: &Path) -> AppResult<u16> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(format!("{}?alt=media", self.object_url(name)))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            warn!(name, "Object missing from bucket");
            return Ok(StatusCode::NOT_FOUND.as_u16());
        }
        let response = check_status(response, "download").await?;
        let status = response.status().as_u16();

        if let Some(parent) = save_to.parent() {
            fs::create_dir_all(parent).await?;
        }
        let partial = partial_path(save_to);
        if let Err(e) = download_to(response, &partial).await {
            if let Err(cleanup) = fs::remove_file(&partial).await {
                debug!(path = %partial.display(), error = %cleanup, "Partial download not removed");
            }
            return Err(e);
        }
        fs::rename(&partial, save_to).await?;

        Ok(status)
    }

    async fn delete(&self, name: &str) -> AppResult<bool> {
        let token = self.access_token().await?;
        let response = self
            .http
            .delete(self.object_url(name))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check_status(response, "delete").await?;
        Ok(true)
    }

    async fn is_connected(&self) -> bool {
        let token = match self.access_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Storage authentication failed");
                return false;
            }
        };

        self.http
            .get(format!("{}/storage/v1/b/{}", self.api_base, self.bucket))
            .bearer_auth(token)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}

/// Sibling of `save_to` that receives the body until it is complete.
fn partial_path(save_to: &Path) -> PathBuf {
    let mut name = save_to.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    save_to.with_file_name(name)
}

async fn download_to(response: Response, path: &Path) -> AppResult<()> {
    let mut file = fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(transport_error)?;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    Ok(())
}

/// Transport failures and timeouts are retryable.
fn transport_error(e: reqwest::Error) -> AppError {
    let message = if e.is_timeout() {
        "Object store request timed out".to_string()
    } else {
        format!("Object store request failed: {e}")
    };
    AppError::with_source(ErrorKind::RemoteUnavailable, message, e)
}

async fn check_status(response: Response, operation: &str) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = format!("Object store {operation} failed with HTTP {status}: {body}");
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::configuration(message),
        s if s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS => {
            AppError::remote_unavailable(message)
        }
        _ => AppError::storage(message),
    })
}
