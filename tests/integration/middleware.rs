use crate::common::{self, MemoryStores};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderValue, Request, StatusCode},
};
use gatehouse::presentation::router::{self, HttpSettings};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tower::ServiceExt;

#[tokio::test]
async fn test_cors_middleware() {
    let stores = MemoryStores::default();
    let settings = HttpSettings {
        cors_allowed_origins: vec!["http://test.com".to_string()],
        ..HttpSettings::default()
    };
    let app = router::app(stores.state(None), &settings).unwrap();

    // Preflight
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/v1/auth/login")
                .header("Origin", "http://test.com")
                .header("Access-Control-Request-Method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin"),
        Some(&HeaderValue::from_static("http://test.com"))
    );
    assert_eq!(
        response.headers().get("access-control-allow-credentials"),
        Some(&HeaderValue::from_static("true"))
    );

    // Unlisted origins get no grant
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://evil.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_none()
    );
}

#[tokio::test]
async fn test_rate_limit_middleware() {
    let stores = MemoryStores::default();
    let app = common::memory_app_with(&stores, None, 2);

    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 12345);
    let request = || {
        Request::builder()
            .method("POST")
            .uri("/api/v1/auth/refresh")
            .extension(ConnectInfo(addr))
            .body(Body::empty())
            .unwrap()
    };

    // Within the burst the handler answers
    for _ in 0..2 {
        let response = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // Health sits outside the limited routes
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .extension(ConnectInfo(addr))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
