//! Integration Tests for the Cache Proxy
//!
//! Drives the full router against an in-memory backing store.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use cache_proxy::{
    api::{create_router, ResponseCache},
    backend::MemoryBackend,
    AppState,
};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app(expiry_ms: i64, capacity: i64) -> (Router, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let cache = ResponseCache::new(expiry_ms, capacity).unwrap();
    let state = AppState::new(cache, backend.clone());
    (create_router(state), backend)
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn get_body(app: &Router, key: &str) -> String {
    let (status, body) = send(app, "GET", &format!("/{}", key)).await;
    assert_eq!(status, StatusCode::OK, "GET /{} failed", key);
    String::from_utf8(body).unwrap()
}

async fn get_json(app: &Router, uri: &str) -> Value {
    let (status, body) = send(app, "GET", uri).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

// == Lookup Tests ==

#[tokio::test]
async fn test_proxy_serves_backend_value() {
    let (app, backend) = create_test_app(1000, 5);
    backend.insert("KEY1", "VAL1").await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/KEY1").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/octet-stream"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"VAL1");
}

#[tokio::test]
async fn test_proxy_404() {
    let (app, _backend) = create_test_app(1000, 5);

    let (status, body) = send(&app, "GET", "/undefined").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("undefined"));
}

#[tokio::test]
async fn test_proxy_incorrect_url_encoding() {
    let (app, backend) = create_test_app(1000, 5);

    let (status, body) = send(&app, "GET", "/t%2%-%%%est").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json.get("error").is_some());
    assert_eq!(backend.fetch_count(), 0);
}

#[tokio::test]
async fn test_proxy_decodes_percent_escapes() {
    let (app, backend) = create_test_app(1000, 5);
    backend.insert("hello world", "spaced").await;

    assert_eq!(get_body(&app, "hello%20world").await, "spaced");
}

#[tokio::test]
async fn test_proxy_store_failure_is_500() {
    let (app, backend) = create_test_app(1000, 5);
    backend.set_unavailable(true);

    let (status, body) = send(&app, "GET", "/KEY1").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json.get("error").is_some());
}

// == Caching Behavior Tests ==

#[tokio::test]
async fn test_proxy_cache() {
    let (app, backend) = create_test_app(1000, 5);
    backend.insert("KEY1", "VAL1").await;
    backend.insert("KEY2", "VAL2").await;

    assert_eq!(get_body(&app, "KEY1").await, "VAL1");

    // Store changes are invisible while the cached copy is fresh
    backend.insert("KEY1", "VAL4").await;
    assert_eq!(get_body(&app, "KEY1").await, "VAL1");
    assert_eq!(backend.fetch_count(), 1);
}

#[tokio::test]
async fn test_proxy_cache_update_after_expiry() {
    let (app, backend) = create_test_app(50, 5);
    backend.insert("KEY1", "VAL1").await;

    assert_eq!(get_body(&app, "KEY1").await, "VAL1");

    backend.insert("KEY1", "VAL4").await;
    tokio::time::sleep(Duration::from_millis(80)).await;

    assert_eq!(get_body(&app, "KEY1").await, "VAL4");
    assert_eq!(backend.fetch_count(), 2);
}

#[tokio::test]
async fn test_proxy_capacity_eviction_refetches() {
    let (app, backend) = create_test_app(60_000, 2);
    for (key, value) in [("a", "A"), ("b", "B"), ("c", "C")] {
        backend.insert(key, value).await;
        get_body(&app, key).await;
    }
    assert_eq!(backend.fetch_count(), 3);

    // "a" was evicted by "c"; "b" and "c" are still cached
    get_body(&app, "c").await;
    get_body(&app, "b").await;
    assert_eq!(backend.fetch_count(), 3);
    get_body(&app, "a").await;
    assert_eq!(backend.fetch_count(), 4);
}

#[tokio::test]
async fn test_zero_capacity_always_fetches() {
    let (app, backend) = create_test_app(60_000, 0);
    backend.insert("KEY1", "VAL1").await;

    for _ in 0..3 {
        assert_eq!(get_body(&app, "KEY1").await, "VAL1");
    }
    assert_eq!(backend.fetch_count(), 3);
}

#[tokio::test]
async fn test_missing_key_is_not_cached() {
    let (app, backend) = create_test_app(60_000, 5);

    let (status, _) = send(&app, "GET", "/later").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    backend.insert("later", "now here").await;
    assert_eq!(get_body(&app, "later").await, "now here");
}

// == Admin Endpoint Tests ==

#[tokio::test]
async fn test_clear_endpoint_forces_refetch() {
    let (app, backend) = create_test_app(60_000, 5);
    backend.insert("KEY1", "VAL1").await;
    get_body(&app, "KEY1").await;

    backend.insert("KEY1", "VAL2").await;
    let (status, body) = send(&app, "DELETE", "/_cache").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["message"], "Cache cleared");

    assert_eq!(get_body(&app, "KEY1").await, "VAL2");
}

#[tokio::test]
async fn test_stats_endpoint_counts() {
    let (app, backend) = create_test_app(60_000, 5);
    backend.insert("KEY1", "VAL1").await;

    get_body(&app, "KEY1").await; // miss, then populated
    get_body(&app, "KEY1").await; // hit
    get_body(&app, "KEY1").await; // hit

    let json = get_json(&app, "/_cache/stats").await;
    assert_eq!(json["hits"], 2);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["entries"], 1);
    assert_eq!(json["capacity"], 5);
    let hit_rate = json["hit_rate"].as_f64().unwrap();
    assert!((hit_rate - 2.0 / 3.0).abs() < 0.001);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _backend) = create_test_app(1000, 5);

    let json = get_json(&app, "/_cache/health").await;

    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}

// == Concurrency Tests ==

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_clients() {
    let (app, backend) = create_test_app(50, 5);
    let pairs = [
        ("KEY1", "VAL1"),
        ("KEY2", "VAL2"),
        ("KEY3", "VAL3"),
        ("KEY4", "VAL4"),
        ("KEY5", "VAL5"),
        ("KEY6", "VAL6"),
    ];
    for (key, value) in pairs {
        backend.insert(key, value).await;
    }

    let mut handles = Vec::new();
    for i in 0..200u64 {
        for (key, value) in pairs {
            let app = app.clone();
            handles.push(tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(i % 10)).await;
                assert_eq!(get_body(&app, key).await, value);
            }));
        }
    }

    for handle in handles {
        handle.await.expect("client task should not panic");
    }

    let json = get_json(&app, "/_cache/stats").await;
    assert!(json["entries"].as_u64().unwrap() <= 5);
}
