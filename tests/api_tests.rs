// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Router-level tests: health, session gate, CORS, security headers, profile.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

use common::{body_json, get_request, FakeBackend, FakeResponses};

#[tokio::test]
async fn test_health_check() {
    let backend = FakeBackend::start(FakeResponses::default()).await;
    let (app, _) = common::create_test_app(&backend);

    let response = app.oneshot(get_request("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let backend = FakeBackend::start(FakeResponses::default()).await;
    let (app, _) = common::create_test_app(&backend);

    // Gated route without a session still carries the headers
    let response = app
        .oneshot(get_request("/api/profile", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let headers = response.headers();
    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    let permissions = headers
        .get("Permissions-Policy")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(permissions.contains("camera=(self)"));
    assert!(permissions.contains("geolocation=(self)"));
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
}

#[tokio::test]
async fn test_cors_preflight_from_frontend() {
    let backend = FakeBackend::start(FakeResponses::default()).await;
    let (app, _) = common::create_test_app(&backend);

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/wallet")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_rejects_unknown_origin() {
    let backend = FakeBackend::start(FakeResponses::default()).await;
    let (app, _) = common::create_test_app(&backend);

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/wallet")
                .header(header::ORIGIN, "https://evil.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_profile_with_session() {
    let backend = FakeBackend::start(FakeResponses::default()).await;
    let (app, state) = common::create_test_app(&backend);
    let cookie = common::session_cookie(&state);

    let response = app
        .oneshot(get_request("/api/profile", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user"]["email"], "asha@example.com");
    assert_eq!(body["user"]["display_name"], "Asha");
    assert_eq!(body["quick_actions"][0]["href"], "/report");
    assert_eq!(body["quick_actions"][1]["href"], "/waste-deposits");
    assert_eq!(body["authority_action"]["href"], "/authority/pickups");
}

#[tokio::test]
async fn test_tampered_session_cookie_rejected() {
    let backend = FakeBackend::start(FakeResponses::default()).await;
    let (app, state) = common::create_test_app(&backend);
    let mut cookie = common::session_cookie(&state);
    cookie.push('x');

    let response = app
        .oneshot(get_request("/api/profile", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
