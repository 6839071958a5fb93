//! Shared harness for the HTTP integration tests
//!
//! Each [`TestApp`] owns a private in-memory database and upload directory,
//! and drives the fully layered router through `oneshot`.

#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, Bytes};
use cafe_server::routes::build_app;
use cafe_server::{Config, ServerState};
use http::{HeaderMap, Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

pub const OWNER_USERNAME: &str = "owner";
pub const OWNER_PASSWORD: &str = "owner-password";

/// Cafe location used by the geofence tests (Monas, Jakarta)
pub const CAFE_LAT: f64 = -6.175392;
pub const CAFE_LNG: f64 = 106.827153;

pub struct TestApp {
    pub state: ServerState,
    router: Router,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(|_| {}).await
    }

    /// Same app backed by a WAL database file with a multi-connection pool,
    /// for tests where requests contend for the write lock
    pub async fn with_file_database() -> Self {
        Self::build(|config| {
            config.database_url = format!("sqlite:{}/cafe.db", config.work_dir);
        })
        .await
    }

    async fn build(customize: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = Config::for_tests(dir.path().to_string_lossy().to_string());
        customize(&mut config);
        let state = ServerState::initialize(&config)
            .await
            .expect("server state");
        let router = build_app(&state).with_state(state.clone());
        Self {
            state,
            router,
            _dir: dir,
        }
    }

    /// Open a long-lived response (SSE) and hand back the unread body
    pub async fn open_stream(&self, uri: &str, token: Option<&str>) -> (StatusCode, HeaderMap, Body) {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = builder.body(Body::empty()).expect("request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        (status, headers, response.into_body())
    }

    /// Send a request and return status, headers and raw body
    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        (status, headers, bytes)
    }

    /// Send a request and decode the JSON body (`Null` when empty)
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, _, bytes) = self.send_raw(request).await;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).to_string())
            })
        };
        (status, body)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/api/auth/login",
                None,
                json!({ "username": username, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["token"]
            .as_str()
            .expect("token")
            .to_string()
    }

    pub async fn owner_token(&self) -> String {
        self.login(OWNER_USERNAME, OWNER_PASSWORD).await
    }

    /// Create an employee and return `(id, token)`
    pub async fn create_employee(
        &self,
        owner: &str,
        username: &str,
        role: &str,
        basic_salary: f64,
    ) -> (i64, String) {
        let password = format!("{username}-password");
        let (status, body) = self
            .post(
                "/api/employees",
                Some(owner),
                json!({
                    "username": username,
                    "password": password,
                    "full_name": username.to_uppercase(),
                    "role": role,
                    "basic_salary": basic_salary,
                    "overtime_rate": 25000.0,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create employee failed: {body}");
        let id = body["data"]["id"].as_i64().expect("employee id");
        let token = self.login(username, &password).await;
        (id, token)
    }

    /// Create a table and return its QR token
    pub async fn create_table(&self, owner: &str, number: &str) -> String {
        let (status, body) = self
            .post(
                "/api/tables",
                Some(owner),
                json!({ "number": number, "capacity": 4 }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create table failed: {body}");
        body["data"]["qr_code"].as_str().expect("qr").to_string()
    }

    /// Create a menu item and return its id
    pub async fn create_menu_item(&self, owner: &str, name: &str, price: f64, stock: Option<i64>) -> i64 {
        let (status, body) = self
            .post(
                "/api/menu",
                Some(owner),
                json!({
                    "name": name,
                    "category": "coffee",
                    "price": price,
                    "cost": price / 3.0,
                    "stock": stock,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create menu item failed: {body}");
        body["data"]["id"].as_i64().expect("menu id")
    }

    /// Place a customer order and return the order detail
    pub async fn place_order(&self, qr: &str, menu_item_id: i64, quantity: i64) -> Value {
        let (status, body) = self
            .post(
                "/api/public/orders",
                None,
                json!({
                    "qr_code": qr,
                    "customer_name": "Budi",
                    "items": [{ "menu_item_id": menu_item_id, "quantity": quantity }],
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create order failed: {body}");
        body["data"].clone()
    }

    /// Point the geofence at [`CAFE_LAT`]/[`CAFE_LNG`] with a 100 m radius
    pub async fn configure_location(&self, owner: &str) {
        let (status, body) = self
            .put(
                "/api/settings",
                Some(owner),
                json!({
                    "cafe_latitude": CAFE_LAT,
                    "cafe_longitude": CAFE_LNG,
                    "geofence_radius_m": 100.0,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "settings update failed: {body}");
    }
}

/// A tiny PNG, enough for the proof pipeline to decode
pub fn png_bytes() -> Vec<u8> {
    let image = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 120, 40]));
    let mut buffer = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .expect("encode png");
    buffer.into_inner()
}

/// `multipart/form-data` request carrying one `file` field
pub fn multipart_upload(uri: &str, filename: &str, data: &[u8]) -> Request<Body> {
    const BOUNDARY: &str = "cafe-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request")
}

/// SSE frames that arrive before the stream stays quiet for `idle`
pub async fn read_events(body: &mut Body, idle: Duration) -> Vec<String> {
    let mut frames = Vec::new();
    while let Ok(Some(Ok(frame))) = tokio::time::timeout(idle, body.frame()).await {
        if let Ok(data) = frame.into_data() {
            frames.push(String::from_utf8_lossy(&data).to_string());
        }
    }
    frames
}

/// Numeric error code of an error envelope
pub fn error_code(body: &Value) -> u64 {
    body["error"]["code"].as_u64().unwrap_or_default()
}
