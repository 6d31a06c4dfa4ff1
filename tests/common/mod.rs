#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use biblioteca::config::Config;
use biblioteca::db;
use biblioteca::infrastructure::AppState;
use biblioteca::server;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::Value;
use std::io::Cursor;
use std::path::PathBuf;
use tower::util::ServiceExt; // for `oneshot`
use wiremock::MockServer;

pub const BOUNDARY: &str = "biblioteca-test-boundary";

pub struct TestApp {
    pub app: Router,
    pub covers_dir: PathBuf,
    // Removes the covers directory when the test ends
    _covers_root: tempfile::TempDir,
    pub google: MockServer,
    pub openlibrary: MockServer,
}

// Full router over an in-memory database, providers pointed at mock servers
pub async fn setup_test_app() -> TestApp {
    let google = MockServer::start().await;
    let openlibrary = MockServer::start().await;

    let covers_root = tempfile::tempdir().expect("Failed to create temp dir");

    let config = Config {
        covers_dir: covers_root.path().join("covers"),
        google_books_url: format!("{}/books/v1/volumes", google.uri()),
        open_library_url: openlibrary.uri(),
        http_timeout_secs: 2,
        ..Default::default()
    };

    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let state = AppState::new(db, &config).expect("Failed to build state");

    TestApp {
        app: server::build_router(state, &config),
        covers_dir: config.covers_dir,
        _covers_root: covers_root,
        google,
        openlibrary,
    }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    pub async fn send_json(&self, req: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = self.send(req).await;
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Add a book through the multipart endpoint, returning its id
    pub async fn add_book(&self, fields: &[(&str, &str)]) -> i64 {
        let (status, body) = self
            .send_json(multipart_request("/api/books", fields, None))
            .await;
        assert_eq!(status, StatusCode::CREATED, "unexpected body {body}");
        body["book"]["id"].as_i64().unwrap()
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .unwrap()
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .body(Body::empty())
        .unwrap()
}

pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// `file` is (field name, filename, bytes)
pub fn multipart_request(
    uri: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((name, filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .uri(uri)
        .method("POST")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([90, 60, 30]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img).write_to(&mut out, format).unwrap();
    out.into_inner()
}
