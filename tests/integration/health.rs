use crate::common::{self, MemoryStores, body_json, empty_request};

use axum::http::StatusCode;
use gatehouse::presentation::router::{self, HttpSettings};
use tower::ServiceExt;

#[tokio::test]
async fn test_health_without_database() {
    let stores = MemoryStores::default();
    let app = common::memory_app(&stores);

    let response = app
        .oneshot(empty_request("GET", "/health", &[]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "not configured");
}

#[tokio::test]
async fn test_health_endpoint() {
    let pool = setup_test_db_or_skip!();

    let state = common::create_test_app_state(pool.clone());
    let app = router::app(state, &HttpSettings::default()).unwrap();

    let response = app
        .oneshot(empty_request("GET", "/health", &[]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["database"], "connected");

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let stores = MemoryStores::default();
    let app = common::memory_app(&stores);

    let response = app
        .oneshot(empty_request("GET", "/api-docs/openapi.json", &[]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["info"]["title"], "Gatehouse Auth API");
}
