use axum::{
    Router,
    body::{Body, Bytes},
    http::{Method, Request},
    response::Response,
};
use chat_stream_proxy::{
    llm::TextGenerationBackend,
    server::{self, handlers::AppState},
};
use futures::StreamExt;
use serde_json::Value;
use std::{
    io::Write,
    sync::{Arc, Mutex},
};
use tempfile::TempDir;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

pub const CHAT_PATH: &str = "/api/chat";

/// Create a temporary directory for test files
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Create a test config YAML file and return its path
pub async fn create_test_config_file(dir: &TempDir, content: &str) -> String {
    let config_path = dir.path().join("config.yaml");
    tokio::fs::write(&config_path, content).await.unwrap();
    config_path.to_string_lossy().to_string()
}

pub fn create_test_app(backend: Arc<dyn TextGenerationBackend>) -> Router {
    server::router(AppState::new(backend), CHAT_PATH)
}

pub fn chat_request(method: Method, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(CHAT_PATH)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

pub fn chat_body(messages: Value) -> Body {
    Body::from(serde_json::json!({ "messages": messages }).to_string())
}

/// Reads the response body frame by frame, preserving chunk boundaries.
pub async fn body_frames(response: Response) -> Vec<Bytes> {
    response
        .into_body()
        .into_data_stream()
        .map(|frame| frame.unwrap())
        .collect()
        .await
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Log output written by the scoped test subscriber.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.contents().matches(needle).count()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Routes this thread's tracing output into memory until the guard drops.
pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}
