//! Shared helpers for router tests.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use stateless_api::app::{Stores, assemble_state, build_app};
use stateless_core::config::AppConfig;
use stateless_core::error::AppError;
use stateless_core::result::AppResult;
use stateless_core::traits::job_handler::{JobHandler, RemoteResponse};
use stateless_database::memory::{MemoryJobStore, MemoryMediaLibrary, MemoryOptionStore};
use stateless_storage::providers::MemoryObjectStore;

/// Job handler that records every call and answers from a script.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    calls: Mutex<Vec<String>>,
    failures: Mutex<Vec<AppError>>,
}

impl RecordingHandler {
    /// Calls received so far, as `"{signal} {job_id}"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Fail the next calls with these errors, in order.
    pub fn fail_with(&self, errors: Vec<AppError>) {
        *self.failures.lock().unwrap() = errors;
    }

    fn answer(&self, call: String) -> AppResult<RemoteResponse> {
        self.calls.lock().unwrap().push(call);
        let mut failures = self.failures.lock().unwrap();
        if !failures.is_empty() {
            return Err(failures.remove(0));
        }
        Ok(RemoteResponse {
            status: 200,
            body: serde_json::json!({ "ok": true }),
        })
    }
}

#[async_trait]
impl JobHandler for RecordingHandler {
    async fn start(&self, job_id: i64, _job: &Value) -> AppResult<RemoteResponse> {
        self.answer(format!("start {job_id}"))
    }

    async fn signal(&self, job_id: i64, signal: &str) -> AppResult<RemoteResponse> {
        self.answer(format!("{signal} {job_id}"))
    }
}

/// Test application context backed by in-memory stores.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Scripted job handler
    pub handler: Arc<RecordingHandler>,
    /// Media library the jobs and processor read
    pub library: Arc<MemoryMediaLibrary>,
    /// Object store the processor writes
    pub store: Arc<MemoryObjectStore>,
    /// Local upload directory
    pub upload_dir: PathBuf,
    _dir: tempfile::TempDir,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let upload_dir = dir.path().to_path_buf();

        let mut config = AppConfig::default();
        config.database.provider = "memory".to_string();
        config.storage.provider = "memory".to_string();
        config.storage.bucket = "test-bucket".to_string();
        config.storage.upload_dir = upload_dir.to_string_lossy().into_owned();
        config.job_handler.retry_backoff_ms = 1;

        let handler = Arc::new(RecordingHandler::default());
        let library = Arc::new(MemoryMediaLibrary::new());
        let store = Arc::new(MemoryObjectStore::new("test-bucket"));
        let stores = Stores {
            jobs: Arc::new(MemoryJobStore::new()),
            options: Arc::new(MemoryOptionStore::new()),
            library: library.clone(),
        };

        let state = assemble_state(config, None, stores, store.clone(), handler.clone());

        Self {
            router: build_app(state),
            handler,
            library,
            store,
            upload_dir,
            _dir: dir,
        }
    }

    /// Register an attachment and write its file under the upload directory.
    pub async fn add_attachment(&self, title: &str, mime_type: &str, file: &str) -> i64 {
        let path = self.upload_dir.join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create upload subdir");
        }
        std::fs::write(&path, b"%PDF-1.4 test").expect("Failed to write upload");
        self.add_missing_attachment(title, mime_type, file).await
    }

    /// Register an attachment without writing any file.
    pub async fn add_missing_attachment(&self, title: &str, mime_type: &str, file: &str) -> i64 {
        self.library
            .create(
                title,
                mime_type,
                file,
                &format!("https://example.com/uploads/{file}"),
            )
            .await
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// GET a path under the default namespace.
    pub async fn get(&self, route: &str) -> TestResponse {
        self.request("GET", &format!("/stateless/v1{route}"), None)
            .await
    }

    /// POST a JSON body to a path under the default namespace.
    pub async fn post(&self, route: &str, body: Option<Value>) -> TestResponse {
        self.request("POST", &format!("/stateless/v1{route}"), body)
            .await
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
