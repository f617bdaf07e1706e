//! Shared helpers for integration tests: an in-memory database, a router
//! wired exactly like production, and request plumbing.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use tower::ServiceExt;
use uuid::Uuid;

use bijou::auth::{create_access_token, hash_password};
use bijou::config::Config;
use bijou::controllers::AppState;
use bijou::mailer::LogMailer;
use bijou::migrations::Migrator;
use bijou::models::user::{self, Role};
use bijou::storage::LocalStorage;

pub const TEST_PASSWORD: &str = "Sup3r$ecret";

/// Config for tests. Secrets are fixed strings; uploads land in a unique
/// temp directory per test.
pub fn test_config() -> Config {
    let upload_dir = format!("/tmp/bijou_test_{}", Uuid::new_v4());
    Config {
        database_url: "sqlite::memory:".to_string(),
        access_token_secret: "test-access-secret".to_string(),
        refresh_token_secret: "test-refresh-secret".to_string(),
        access_token_ttl_secs: 60,
        refresh_token_ttl_secs: 86_400,
        verification_code_ttl_secs: 86_400,
        verification_resend_limit: Some(3),
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        environment: "test".to_string(),
        upload_dir,
        max_upload_size: 2_000_000,
        public_base_url: "http://localhost:3000".to_string(),
        mail_api_url: None,
        mail_api_key: None,
        mail_from_email: "no-reply@bijou.app".to_string(),
        mail_from_name: "Bijou".to_string(),
    }
}

/// Fresh in-memory database with all migrations applied.
///
/// A single pooled connection keeps the in-memory database alive for the
/// whole test.
pub async fn test_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1);

    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to test database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Application state backed by [`test_db`] and the logging mailer.
pub async fn test_state() -> AppState {
    let config = Arc::new(test_config());
    let db = test_db().await;
    let storage = LocalStorage::new(config.upload_dir.clone(), config.public_base_url.clone());

    AppState {
        db,
        config,
        mailer: Arc::new(LogMailer),
        storage: Arc::new(storage),
    }
}

/// The production router over a fresh test state.
pub async fn test_app() -> (Router, AppState) {
    let state = test_state().await;
    (bijou::build_router(state.clone()), state)
}

// ── Users ──

/// Insert a verified user directly, bypassing the register/verify flow.
pub async fn create_verified_user(
    state: &AppState,
    username: &str,
    email: &str,
    role: Role,
) -> user::Model {
    let password_hash = hash_password(TEST_PASSWORD)
        .await
        .expect("Failed to hash password");
    let now = Utc::now().naive_utc();

    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        fullname: Set(format!("{} Test", username)),
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        role: Set(role),
        verified: Set(true),
        avatar_url: Set(state.config.default_avatar_url()),
        refresh_token: Set(None),
        deleted_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await
    .expect("Failed to insert test user")
}

/// Mint an access token for a user, as login would.
pub fn access_token_for(state: &AppState, user: &user::Model) -> String {
    create_access_token(user, &state.config).expect("Failed to create access token")
}

/// A verified admin plus a ready-to-use bearer token.
pub async fn admin_token(state: &AppState) -> String {
    let admin = create_verified_user(state, "rootadmin", "admin@test.com", Role::Admin).await;
    access_token_for(state, &admin)
}

// ── Requests ──

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("Failed to parse response body as JSON")
    }

    /// The envelope `message` field.
    pub fn message(&self) -> String {
        self.json()["message"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }

    /// The envelope `data` field.
    pub fn data(&self) -> serde_json::Value {
        self.json()["data"].clone()
    }

    /// First `Set-Cookie` value starting with the given name.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let prefix = format!("{}=", name);
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&prefix))
            .map(|v| v.split(';').next().unwrap_or(v).to_string())
    }
}

async fn run(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request");

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body")
        .to_vec();

    TestResponse {
        status,
        headers,
        body,
    }
}

fn apply_auth(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {}", token)),
        None => builder,
    }
}

/// Send a JSON request.
pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: &serde_json::Value,
) -> TestResponse {
    let body = body.to_string();
    let request = apply_auth(Request::builder().method(method).uri(uri), token)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .expect("Failed to build request");
    run(app, request).await
}

/// Send a request without a body.
pub async fn send_empty(app: &Router, method: Method, uri: &str, token: Option<&str>) -> TestResponse {
    let request = apply_auth(Request::builder().method(method).uri(uri), token)
        .body(Body::empty())
        .expect("Failed to build request");
    run(app, request).await
}

/// Send a request without a body but with a `Cookie` header.
pub async fn send_with_cookie(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: &str,
) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .expect("Failed to build request");
    run(app, request).await
}

// ── Multipart ──

const BOUNDARY: &str = "bijou-test-boundary";

/// Build a multipart/form-data body from text fields plus an optional file
/// part. Returns the content type and the raw body.
pub fn multipart_body(
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> (String, Vec<u8>) {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((name, filename, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// Send a multipart request.
pub async fn send_multipart(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> TestResponse {
    let (content_type, body) = multipart_body(fields, file);
    let request = apply_auth(Request::builder().method(method).uri(uri), token)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .expect("Failed to build request");
    run(app, request).await
}
