//! Cloud Storage client against a local HTTP stand-in.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use stateless_core::config::StorageConfig;
use stateless_core::error::ErrorKind;
use stateless_core::traits::object_store::ObjectStore;
use stateless_storage::ServiceAccountKey;
use stateless_storage::providers::GcsObjectStore;

const PRIVATE_KEY: &str = include_str!("fixtures/service_account_key.pem");
const TOKEN_BODY: &str = r#"{"access_token":"test-token","expires_in":3600}"#;

/// Serves the token endpoint and answers every other request with `object_response`.
struct FakeGcs {
    base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeGcs {
    async fn start(object_response: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    return;
                };
                let seen = seen.clone();
                tokio::spawn(async move {
                    answer(socket, object_response, seen).await;
                });
            }
        });

        Self { base, requests }
    }

    fn client(&self) -> GcsObjectStore {
        let config = StorageConfig {
            provider: "gcs".to_string(),
            bucket: "media".to_string(),
            timeout_seconds: 5,
            ..StorageConfig::default()
        };
        let key = serde_json::json!({
            "client_email": "sync@example.iam.gserviceaccount.com",
            "private_key": PRIVATE_KEY,
            "token_uri": format!("{}/token", self.base),
        });
        let key = ServiceAccountKey::parse(&key.to_string()).unwrap();
        GcsObjectStore::new(&config, key)
            .unwrap()
            .with_api_base(&self.base)
    }

    fn request_lines(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn answer(mut socket: TcpStream, object_response: &str, seen: Arc<Mutex<Vec<String>>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    while buf.len() < head_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let request_line = head.lines().next().unwrap_or_default().to_string();
    let response = if request_line.starts_with("POST /token") {
        format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{TOKEN_BODY}",
            TOKEN_BODY.len()
        )
    } else {
        object_response.to_string()
    };
    seen.lock().unwrap().push(request_line);

    socket.write_all(response.as_bytes()).await.ok();
    socket.shutdown().await.ok();
}

#[tokio::test]
async fn test_download_writes_body_to_path() {
    let gcs = FakeGcs::start(
        "HTTP/1.1 200 OK\r\ncontent-type: image/png\r\ncontent-length: 5\r\nconnection: close\r\n\r\nhello",
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("2024/a.png");

    let status = gcs.client().get("2024/a.png", &target).await.unwrap();

    assert_eq!(status, 200);
    assert_eq!(std::fs::read(&target).unwrap(), b"hello");
    assert!(!dir.path().join("2024/a.png.part").exists());
    assert!(
        gcs.request_lines()
            .iter()
            .any(|line| line.starts_with("GET /storage/v1/b/media/o/2024%2Fa.png?alt=media "))
    );
}

#[tokio::test]
async fn test_missing_object_reports_not_found() {
    let gcs = FakeGcs::start(
        "HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("gone.pdf");

    let status = gcs.client().get("gone.pdf", &target).await.unwrap();

    assert_eq!(status, 404);
    assert!(!target.exists());
}

#[tokio::test]
async fn test_unavailable_bucket_is_retryable_error() {
    let gcs = FakeGcs::start(
        "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("manual.pdf");

    let err = gcs.client().get("manual.pdf", &target).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::RemoteUnavailable);
    assert!(err.is_retryable());
    assert!(!target.exists());
}

#[tokio::test]
async fn test_refused_credentials_are_not_reported_as_missing() {
    let gcs = FakeGcs::start(
        "HTTP/1.1 403 Forbidden\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
    )
    .await;
    let dir = tempfile::tempdir().unwrap();

    let err = gcs
        .client()
        .get("manual.pdf", &dir.path().join("manual.pdf"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Configuration);
}

#[tokio::test]
async fn test_truncated_body_leaves_no_file_behind() {
    let gcs = FakeGcs::start(
        "HTTP/1.1 200 OK\r\ncontent-type: application/pdf\r\ncontent-length: 1000\r\nconnection: close\r\n\r\n0123456789",
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("manual.pdf");

    let err = gcs.client().get("manual.pdf", &target).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::RemoteUnavailable);
    assert!(!target.exists());
    assert!(!dir.path().join("manual.pdf.part").exists());
}
