//! Shared helpers for HTTP-level tests: an app over `MemoryStore` with one logged-in user.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use storefront_api::{
    build_app, AppState, CatalogService, Category, MemoryStore, NewCategory, Store,
};
use tower::ServiceExt;

pub const USERNAME: &str = "testuser";
pub const PASSWORD: &str = "testpass";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub token: String,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_body_limit(1024 * 1024).await
    }

    pub async fn with_body_limit(body_limit_bytes: usize) -> Self {
        let store = Arc::new(MemoryStore::new());
        let dyn_store: Arc<dyn Store> = store.clone();
        CatalogService::register_user(dyn_store.as_ref(), USERNAME, PASSWORD)
            .await
            .expect("register test user");
        let token = CatalogService::obtain_token(
            dyn_store.as_ref(),
            serde_json::json!({ "username": USERNAME, "password": PASSWORD }),
        )
        .await
        .expect("obtain test token");
        let router = build_app(AppState::new(dyn_store), body_limit_bytes);
        TestApp { router, store, token }
    }

    pub async fn category(&self, name: &str) -> Category {
        self.store
            .create_category(&NewCategory { name: name.into() })
            .await
            .expect("create category")
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let (status, _, body) = self.send_full(req).await;
        (status, body)
    }

    pub async fn send_full(&self, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
        let response = self.router.clone().oneshot(req).await.expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, headers, body)
    }

    pub fn auth(&self) -> Option<&str> {
        Some(self.token.as_str())
    }
}

pub fn request(method: Method, path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {}", token));
    }
    builder.body(Body::empty()).expect("valid request")
}

pub fn json_request(method: Method, path: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {}", token));
    }
    builder.body(Body::from(body.to_string())).expect("valid request")
}

pub fn form_request(method: Method, path: &str, token: Option<&str>, fields: &[(&str, &str)]) -> Request<Body> {
    let encoded = fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, v.replace(' ', "+")))
        .collect::<Vec<_>>()
        .join("&");
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {}", token));
    }
    builder.body(Body::from(encoded)).expect("valid request")
}

pub const MULTIPART_BOUNDARY: &str = "storefront-test-boundary";

/// `multipart/form-data` body with one text part per field, as HTML forms and test clients send it.
pub fn multipart_request(method: Method, path: &str, token: Option<&str>, fields: &[(&str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            MULTIPART_BOUNDARY, name, value
        ));
    }
    body.push_str(&format!("--{}--\r\n", MULTIPART_BOUNDARY));
    let mut builder = Request::builder().method(method).uri(path).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
    );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {}", token));
    }
    builder.body(Body::from(body)).expect("valid request")
}

/// A valid JSON product payload for `category_id`.
pub fn product_body(name: &str, price: f64, category_id: i64, stock: i64) -> Value {
    serde_json::json!({
        "name": name,
        "description": format!("A {}.", name.to_lowercase()),
        "price": price,
        "category_id": category_id,
        "stock_quantity": stock,
    })
}
