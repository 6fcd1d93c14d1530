use std::time::Duration;

use anime_service::blocking::{self, detect_blocking};
use anime_service::error::{Error, Result};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::from_fn,
    routing::get,
    Router,
};
use tower::ServiceExt;

async fn sleeps_inline() -> Result<&'static str> {
    blocking::sleep(Duration::from_millis(5))?;
    Ok("slept")
}

async fn sleeps_offloaded() -> Result<&'static str> {
    blocking::offload(|| blocking::sleep(Duration::from_millis(5))).await??;
    Ok("slept")
}

fn app() -> Router {
    Router::new()
        .route("/inline", get(sleeps_inline))
        .route("/offloaded", get(sleeps_offloaded))
        .layer(from_fn(detect_blocking))
}

async fn status_of(uri: &str) -> StatusCode {
    app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn blocking_call_on_event_thread_is_detected() {
    assert_eq!(status_of("/inline").await, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn blocking_call_on_blocking_pool_passes() {
    assert_eq!(status_of("/offloaded").await, StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn detection_follows_the_request_across_workers() {
    let result = tokio::spawn(blocking::non_blocking(async {
        tokio::task::yield_now().await;
        blocking::check("socket read")
    }))
    .await
    .unwrap();

    let err = Error::from(result.unwrap_err());
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}
