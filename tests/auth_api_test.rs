mod common;

use axum::http::{header, Method, StatusCode};
use common::{form_request, json_request, request, TestApp, PASSWORD, USERNAME};
use serde_json::json;

#[tokio::test]
async fn every_catalog_endpoint_requires_authentication() {
    let app = TestApp::new().await;
    let electronics = app.category("Electronics").await;
    let cases = [
        (Method::GET, "/api/products/".to_string()),
        (Method::POST, "/api/products/".to_string()),
        (Method::GET, "/api/products/1/".to_string()),
        (Method::PUT, "/api/products/1/".to_string()),
        (Method::PATCH, "/api/products/1/".to_string()),
        (Method::DELETE, "/api/products/1/".to_string()),
        (Method::GET, "/api/categories/".to_string()),
        (Method::POST, "/api/categories/".to_string()),
        (Method::DELETE, "/api/auth/token/".to_string()),
    ];
    for (method, path) in cases {
        for token in [None, Some("0000000000000000000000000000000000000000")] {
            let req = json_request(method.clone(), &path, token, json!({ "category_id": electronics.id }));
            let (status, headers, body) = app.send_full(req).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {path}");
            assert_eq!(headers.get(header::WWW_AUTHENTICATE).unwrap(), "Token");
            assert_eq!(body["error"]["code"], "not_authenticated");
        }
    }
    let (_, body) = app.send(request(Method::GET, "/api/categories/", app.auth())).await;
    assert_eq!(body["meta"]["count"], 1);
}

#[tokio::test]
async fn unknown_scheme_and_malformed_header_are_rejected() {
    let app = TestApp::new().await;
    for value in ["Basic dGVzdHVzZXI6dGVzdHBhc3M=", "Token", "Token a b"] {
        let req = axum::http::Request::builder()
            .uri("/api/products/")
            .header(header::AUTHORIZATION, value)
            .body(axum::body::Body::empty())
            .unwrap();
        let (status, _) = app.send(req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{value}");
    }

    let req = axum::http::Request::builder()
        .uri("/api/products/")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.token))
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, _) = app.send(req).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_returns_the_same_token_until_logout() {
    let app = TestApp::new().await;
    let credentials = json!({ "username": USERNAME, "password": PASSWORD });

    let (status, body) = app
        .send(json_request(Method::POST, "/api/auth/token/", None, credentials.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["token"], app.token.as_str());

    let (status, body) = app
        .send(form_request(
            Method::POST,
            "/api/auth/token",
            None,
            &[("username", USERNAME), ("password", PASSWORD)],
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["token"], app.token.as_str());

    let (status, _) = app.send(request(Method::DELETE, "/api/auth/token/", app.auth())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.send(request(Method::GET, "/api/products/", app.auth())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send(json_request(Method::POST, "/api/auth/token/", None, credentials))
        .await;
    assert_eq!(status, StatusCode::OK);
    let fresh = body["data"]["token"].as_str().unwrap().to_string();
    assert_ne!(fresh, app.token);
    assert_eq!(fresh.len(), 40);
    let (status, _) = app.send(request(Method::GET, "/api/products/", Some(&fresh))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn bad_credentials_fail_validation() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(json_request(
            Method::POST,
            "/api/auth/token/",
            None,
            json!({ "username": USERNAME, "password": "wrong" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["details"]["non_field_errors"],
        json!(["Unable to log in with provided credentials."])
    );

    let (status, body) = app
        .send(json_request(Method::POST, "/api/auth/token/", None, json!({ "username": "nobody" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["password"], json!(["This field is required."]));
}

#[tokio::test]
async fn categories_are_created_and_listed() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(json_request(Method::POST, "/api/categories/", app.auth(), json!({ "name": "  Books " })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], "Books");
    let id = body["data"]["id"].clone();

    let (status, body) = app
        .send(form_request(Method::POST, "/api/categories", app.auth(), &[("name", "Garden tools")]))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], "Garden tools");

    let (status, body) = app
        .send(json_request(Method::POST, "/api/categories/", app.auth(), json!({ "name": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["name"], json!(["This field may not be blank."]));

    let (status, body) = app.send(request(Method::GET, "/api/categories/", app.auth())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], 2);
    assert_eq!(body["data"][0], json!({ "id": id, "name": "Books" }));
}

#[tokio::test]
async fn service_endpoints_need_no_token() {
    let app = TestApp::new().await;

    let (status, body) = app.send(request(Method::GET, "/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = app.send(request(Method::GET, "/ready", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"]["reachable"], true);

    let (status, body) = app.send(request(Method::GET, "/version", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "storefront-api");

    let (status, body) = app.send(request(Method::GET, "/api/openapi.json", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/products/{id}/"].is_object());
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    use tower::ServiceExt;

    let app = TestApp::new().await;
    let body = json!({ "name": "x".repeat(2 * 1024 * 1024) }).to_string();
    let req = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/categories/")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .header(header::AUTHORIZATION, format!("Token {}", app.token))
        .body(axum::body::Body::from(body))
        .unwrap();
    let response = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn configured_body_limit_overrides_extractor_default() {
    use tower::ServiceExt;

    let app = TestApp::with_body_limit(8 * 1024 * 1024).await;
    let electronics = app.category("Electronics").await;
    let mut product = common::product_body("Catalogue", 10.0, electronics.id, 1);
    product["description"] = json!("x".repeat(3 * 1024 * 1024));

    let (status, body) = app
        .send(json_request(Method::POST, "/api/products/", app.auth(), product.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["description"].as_str().map(str::len), Some(3 * 1024 * 1024));

    // No Content-Length: the limit trips while the extractor reads the body.
    let small = TestApp::with_body_limit(1024 * 1024).await;
    let req = json_request(Method::POST, "/api/products/", small.auth(), product);
    assert!(req.headers().get(header::CONTENT_LENGTH).is_none());
    let response = small.router.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn unsupported_method_authenticates_before_method_check() {
    let app = TestApp::new().await;
    for (method, path) in [
        (Method::DELETE, "/api/categories/"),
        (Method::PUT, "/api/categories"),
        (Method::DELETE, "/api/products/"),
        (Method::POST, "/api/products/1/"),
    ] {
        let (status, headers, _) = app.send_full(request(method.clone(), path, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {path}");
        assert_eq!(headers.get(header::WWW_AUTHENTICATE).unwrap(), "Token");
    }

    let (status, body) = app.send(request(Method::DELETE, "/api/categories/", app.auth())).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"]["code"], "method_not_allowed");

    let (status, _) = app.send(request(Method::POST, "/api/products/1/", app.auth())).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
