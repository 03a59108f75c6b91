//! Common test utilities and fixtures
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use musicify_core::{MetadataLookup, UpsertUser, User};
use musicify_server::{create_router, AppState, AuthService, FileStorage};
use musicify_storage::{users, Database};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key";

/// Router over a fresh temp-file database and media directory
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub db: Database,
    pub auth: Arc<AuthService>,
    pub media_dir: TempDir,
    _db_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(None).await
    }

    pub async fn with_metadata(lookup: Arc<dyn MetadataLookup>) -> Self {
        Self::build(Some(lookup)).await
    }

    async fn build(lookup: Option<Arc<dyn MetadataLookup>>) -> Self {
        let db_dir = TempDir::new().unwrap();
        let db_path = db_dir.path().join("test.db");
        let db = Database::connect(&format!("sqlite://{}", db_path.display()))
            .await
            .unwrap();

        let media_dir = TempDir::new().unwrap();
        let file_storage = FileStorage::new(media_dir.path().to_path_buf(), "/media");
        file_storage.initialize().await.unwrap();

        let auth = Arc::new(AuthService::new(TEST_SECRET.to_string(), 1));

        let mut state = AppState::new(db.clone(), Arc::clone(&auth), Arc::new(file_storage));
        if let Some(lookup) = lookup {
            state = state.with_metadata(lookup);
        }

        let router = create_router(state.clone(), media_dir.path());

        Self {
            router,
            state,
            db,
            auth,
            media_dir,
            _db_dir: db_dir,
        }
    }

    /// Register a user the way the auth callback would and return a token for them
    pub async fn register(&self, clerk_id: &str) -> (User, String) {
        let user = users::upsert(
            self.db.pool(),
            UpsertUser {
                clerk_id: clerk_id.to_string(),
                first_name: Some(clerk_id.to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let token = self.auth.create_token(clerk_id).unwrap();
        (user, token)
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn post_multipart(&self, uri: &str, form: MultipartBody) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, form.content_type())
            .body(Body::from(form.finish()))
            .unwrap();
        self.send(request).await
    }

    /// Raw bytes of a served media URL
    pub async fn fetch_media(&self, url: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder().uri(url).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }
}

const BOUNDARY: &str = "musicify-test-boundary";

/// Minimal multipart/form-data builder
#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

/// A song upload with the files the add route requires
pub fn song_form(name: &str) -> MultipartBody {
    MultipartBody::new()
        .text("name", name)
        .text("album", "Test Album")
        .file("audio", "track.mp3", "audio/mpeg", b"fake audio bytes")
        .file("image", "cover.png", "image/png", b"fake image bytes")
}
