//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use vstore_api::{AppState, build_app};
use vstore_core::traits::storage::DiskStore;
use vstore_core::config::{AppConfig, CatalogProvider};
use vstore_database::Catalog;
use vstore_storage::LocalDiskStore;

const BOUNDARY: &str = "vstore-test-boundary";

/// One part of a multipart body
pub enum Part<'a> {
    /// Text field: name, value
    Text(&'a str, &'a str),
    /// The `file` field: file name, content
    File(&'a str, &'a [u8]),
}

/// Encode `parts` in order as a `multipart/form-data` body
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        match part {
            Part::Text(name, value) => body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            ),
            Part::File(file_name, data) => {
                body.extend_from_slice(
                    format!(
                        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Physical storage root
    pub root: PathBuf,
    /// Keeps the storage root alive
    _dir: TempDir,
}

impl TestApp {
    /// Create a new test application over an empty catalog and storage root
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test application after adjusting the default config
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = dir.path().join("storage");

        let mut config = AppConfig::default();
        config.database.provider = CatalogProvider::Memory;
        config.storage.root_path = root.to_string_lossy().into_owned();
        adjust(&mut config);

        let disk = LocalDiskStore::new(root)
            .await
            .expect("Failed to init storage");
        let root = disk.root().to_path_buf();
        let state = AppState::new(config, Catalog::memory(), Arc::new(disk));

        Self {
            router: build_app(state),
            root,
            _dir: dir,
        }
    }

    /// Send a JSON request
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

        self.send(req).await
    }

    /// Upload `data` as the multipart `file` part named `file_name`
    pub async fn upload(
        &self,
        fields: &[(&str, &str)],
        file_name: &str,
        data: &[u8],
    ) -> TestResponse {
        self.multipart(fields, Some((file_name, data))).await
    }

    /// Send a multipart upload to `POST /api/files`
    pub async fn multipart(
        &self,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> TestResponse {
        let mut parts: Vec<Part<'_>> = fields
            .iter()
            .map(|(name, value)| Part::Text(*name, *value))
            .collect();
        if let Some((file_name, data)) = file {
            parts.push(Part::File(file_name, data));
        }
        self.send_multipart(multipart_body(&parts), None).await
    }

    /// Send an encoded multipart body, split into frames of `frame_size`
    /// bytes when given
    pub async fn send_multipart(&self, body: Vec<u8>, frame_size: Option<usize>) -> TestResponse {
        let body = match frame_size {
            Some(size) => {
                let frames: Vec<Result<Vec<u8>, std::io::Error>> =
                    body.chunks(size).map(|c| Ok(c.to_vec())).collect();
                Body::from_stream(futures::stream::iter(frames))
            }
            None => Body::from(body),
        };

        let req = Request::builder()
            .method("POST")
            .uri("/api/files")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(body)
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Create a folder and return its `data` object
    pub async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Value {
        let response = self
            .request(
                "POST",
                "/api/folders",
                Some(serde_json::json!({
                    "name": name,
                    "parent_id": parent_id,
                    "creator_user_id": uuid::Uuid::new_v4(),
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["data"].clone()
    }

    /// Physical path of a virtual path under the storage root
    pub fn on_disk(&self, virtual_path: &str) -> PathBuf {
        virtual_path
            .split('/')
            .filter(|s| !s.is_empty())
            .fold(self.root.clone(), |p, s| p.join(s))
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            raw: body_bytes.to_vec(),
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body (`Null` when not JSON)
    pub body: Value,
    /// Raw body bytes
    pub raw: Vec<u8>,
}

impl TestResponse {
    /// The `data` member of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// A string member of `data`
    pub fn str(&self, key: &str) -> String {
        self.body["data"][key]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }
}
