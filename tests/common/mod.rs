#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use std::{
    io,
    sync::{Arc, Mutex},
    time::SystemTime,
};
use tour_cms::{
    AppConfig, AppState, InMemoryRepository, MockImageHost, create_router,
    auth::Claims,
    repository::{Repository, RepositoryState},
    storage::ImageHostState,
};
use tower::util::ServiceExt;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;
use uuid::Uuid;

pub const TEST_USER: Uuid = Uuid::from_u128(1);
pub const OTHER_USER: Uuid = Uuid::from_u128(2);

const BOUNDARY: &str = "tour-cms-test-boundary";
const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-a-png";

// --- Tokens ---

pub fn create_token(user_id: Uuid, secret: &str, exp_offset: i64) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: user_id,
        iat: Some(now as usize),
        exp: (now + exp_offset) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// A valid one-hour token for `user_id`, signed with the default test secret.
pub fn bearer(user_id: Uuid) -> String {
    format!(
        "Bearer {}",
        create_token(user_id, &AppConfig::default().jwt_secret, 3600)
    )
}

// --- State ---

pub struct TestContext {
    pub router: Router,
    pub repo: Arc<InMemoryRepository>,
    pub images: MockImageHost,
    pub config: AppConfig,
}

pub fn test_context() -> TestContext {
    context_with(MockImageHost::new(), AppConfig::default())
}

pub fn failing_upload_context() -> TestContext {
    context_with(MockImageHost::new_failing(), AppConfig::default())
}

pub fn context_with(images: MockImageHost, config: AppConfig) -> TestContext {
    let repo = Arc::new(InMemoryRepository::new());
    let state = AppState {
        repo: repo.clone() as RepositoryState,
        images: Arc::new(images.clone()) as ImageHostState,
        config: config.clone(),
    };

    TestContext {
        router: create_router(state),
        repo,
        images,
        config,
    }
}

/// Router over an arbitrary repository, for tests that need a misbehaving store.
pub fn router_with(repo: RepositoryState, images: MockImageHost) -> Router {
    create_router(AppState {
        repo,
        images: Arc::new(images) as ImageHostState,
        config: AppConfig::default(),
    })
}

// --- Logs ---

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Captures every event emitted on the current thread while the guard lives.
pub fn capture_logs() -> (DefaultGuard, LogBuffer) {
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    (tracing::subscriber::set_default(subscriber), logs)
}

// --- Requests ---

pub fn empty_request(method: Method, uri: &str, user: Option<Uuid>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, bearer(user));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: Method, uri: &str, user: Uuid, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, bearer(user))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Builds a multipart body. Every file part is sent as `image/png`.
pub fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, file_name) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(PNG_BYTES);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(
    method: Method,
    uri: &str,
    user: Uuid,
    fields: &[(&str, &str)],
    files: &[(&str, &str)],
) -> Request<Body> {
    raw_multipart_request(method, uri, user, multipart_body(fields, files))
}

pub fn raw_multipart_request(method: Method, uri: &str, user: Uuid, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, bearer(user))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Runs `request` through the router and returns the status and JSON body
/// (`Value::Null` when the body is not JSON).
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

// --- Fixtures ---

pub async fn seed_category<R: Repository + ?Sized>(
    repo: &R,
    owner: Uuid,
    name: &str,
) -> tour_cms::models::Category {
    let category = tour_cms::models::Category::new(owner, name.to_string());
    repo.insert_category(&category).await.unwrap()
}

/// Serialized snapshot of a stored category, for "unchanged" assertions.
pub async fn category_snapshot<R: Repository + ?Sized>(repo: &R, id: Uuid) -> Vec<u8> {
    let category = repo.get_category(id).await.unwrap().unwrap();
    serde_json::to_vec(&category).unwrap()
}
