mod common;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::ServiceExt;

use app_starter::application::services::MailerQueue;
use app_starter::domain::email_worker::FailedJobs;
use app_starter::infrastructure::cache::Cache;
use app_starter::infrastructure::persistence::InMemoryExampleDatasource;
use app_starter::state::AppState;

#[tokio::test]
async fn test_health_endpoint_success() {
    let server = common::test_server(common::create_test_state());

    let response = server.get("/health").await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
    assert_eq!(json["checks"]["mailQueue"]["status"], "disabled");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let server = common::test_server(common::create_test_state());

    let json = server.get("/health").await.json::<Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json["checks"].get("cache").is_some());
    assert!(json["checks"].get("mailQueue").is_some());
}

#[tokio::test]
async fn test_health_degraded_when_worker_stopped() {
    let (tx, rx) = mpsc::channel(4);
    drop(rx);

    let state = AppState::new(
        Arc::new(common::test_config(&[])),
        Arc::new(InMemoryExampleDatasource::new()),
        Cache::in_memory(),
        MailerQueue::new(tx, Arc::new(FailedJobs::new(10))),
    );
    let server = common::test_server(state);

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["mailQueue"]["status"], "error");
}

#[tokio::test]
async fn test_trailing_slash_is_trimmed() {
    let app = app_starter::routes::app_router(common::create_test_state());

    let response = app
        .oneshot(Request::builder().uri("/health/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "healthy");
}
