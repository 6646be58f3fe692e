//! End-to-end checks of `/health` and `/external` against mock dependencies.

use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

mod common;

const DATA_BODY: &str = r#"{"message":"ok","data":{"items":[1,2,3],"total":3}}"#;

#[tokio::test]
async fn test_health_reports_connected_store() {
    let app = common::start_app("http://127.0.0.1:9").await;

    let res = app.client.get(app.url("/health")).send().await.expect("API unreachable");
    assert_eq!(res.status(), 200);

    let json: Value = res.json().await.unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], "connected");
    assert_eq!(json["service"], "user-api");
    assert_eq!(json["version"], "1.0.0");
    assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_health_degrades_to_warning_when_store_unreachable() {
    let app = common::start_app_with("http://127.0.0.1:9", |config| {
        config.database.path = "/nonexistent/user-api-tests/users.sqlite".into();
    })
    .await;

    let res = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), 200, "health never fails the request");

    let json: Value = res.json().await.unwrap();
    assert_eq!(json["status"], "warning");
    assert_eq!(json["database"], "disconnected");
}

#[tokio::test]
async fn test_external_success() {
    let backend = common::start_mock_backend(200, DATA_BODY).await;
    let app = common::start_app(&backend).await;

    let res = app.client.get(app.url("/external")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    let json: Value = res.json().await.unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["microservice_url"], backend.as_str());
    assert_eq!(json["data"]["data"]["total"], 3);
    assert!(json["response_time"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_external_recovers_after_transient_failures() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let backend = common::start_programmable_backend(move || {
        let cc = cc.clone();
        async move {
            if cc.fetch_add(1, Ordering::SeqCst) < 2 {
                (503, r#"{"error":"warming up"}"#.into())
            } else {
                (200, DATA_BODY.into())
            }
        }
    })
    .await;
    let app = common::start_app(&backend).await;

    let res = app.client.get(app.url("/external")).send().await.unwrap();
    assert_eq!(res.status(), 200, "should succeed on the third attempt");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_external_dependency_error_maps_to_503() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let backend = common::start_programmable_backend(move || {
        cc.fetch_add(1, Ordering::SeqCst);
        async { (500, r#"{"error":"boom"}"#.into()) }
    })
    .await;
    let app = common::start_app(&backend).await;

    let res = app.client.get(app.url("/external")).send().await.unwrap();
    assert_eq!(res.status(), 503);

    let json: Value = res.json().await.unwrap();
    assert_eq!(json["status"], "error");
    assert_eq!(json["http_status"], 500);
    assert_eq!(json["microservice_url"], backend.as_str());
    assert_eq!(calls.load(Ordering::SeqCst), 3, "every attempt is spent");
}

#[tokio::test]
async fn test_external_dependency_503_all_attempts() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let backend = common::start_programmable_backend(move || {
        cc.fetch_add(1, Ordering::SeqCst);
        async { (503, r#"{"error":"unavailable"}"#.into()) }
    })
    .await;
    let app = common::start_app(&backend).await;

    let res = app.client.get(app.url("/external")).send().await.unwrap();
    assert_eq!(res.status(), 503);

    let json: Value = res.json().await.unwrap();
    assert_eq!(json["status"], "error");
    assert_eq!(json["http_status"], 503);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_external_reports_uncommon_dependency_status() {
    let backend = common::start_mock_backend(418, r#"{"error":"teapot"}"#).await;
    let app = common::start_app(&backend).await;

    let res = app.client.get(app.url("/external")).send().await.unwrap();
    assert_eq!(res.status(), 503);

    let json: Value = res.json().await.unwrap();
    assert_eq!(json["http_status"], 418);
}

#[tokio::test]
async fn test_health_warns_when_database_file_removed() {
    let app = common::start_app("http://127.0.0.1:9").await;
    std::fs::remove_file(&app.db_path).unwrap();

    let res = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    let json: Value = res.json().await.unwrap();
    assert_eq!(json["status"], "warning");
    assert_eq!(json["database"], "disconnected");
    assert!(!app.db_path.exists(), "health check must not recreate the database");
}

#[tokio::test]
async fn test_external_timeout_maps_to_500() {
    let backend = common::start_stalled_backend().await;
    let app = common::start_app(&backend).await;

    let start = Instant::now();
    let res = app.client.get(app.url("/external")).send().await.unwrap();
    let elapsed = start.elapsed();
    assert_eq!(res.status(), 500);

    // 3 attempts at 300ms plus 2 delays of 50ms.
    assert!(elapsed >= Duration::from_millis(900), "took {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(5), "took {:?}", elapsed);

    let json: Value = res.json().await.unwrap();
    assert_eq!(json["status"], "error");
    assert!(json["error"].as_str().unwrap().contains("timed out"));
    assert!(json.get("http_status").is_none());
}

#[tokio::test]
async fn test_external_connection_refused_maps_to_500() {
    let backend = common::closed_port().await;
    let app = common::start_app(&backend).await;

    let res = app.client.get(app.url("/external")).send().await.unwrap();
    assert_eq!(res.status(), 500);

    let json: Value = res.json().await.unwrap();
    assert_eq!(json["status"], "error");
    assert_eq!(json["microservice_url"], backend.as_str());
    assert!(!json["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_external_invalid_url_fails_without_calling() {
    let app = common::start_app("not a url").await;

    let res = app.client.get(app.url("/external")).send().await.unwrap();
    assert_eq!(res.status(), 500);

    let json: Value = res.json().await.unwrap();
    assert_eq!(json["microservice_url"], "not a url");
}
