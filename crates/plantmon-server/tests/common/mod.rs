#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::Utc;
use plantmon_alert::engine::AlertEngine;
use plantmon_server::app;
use plantmon_server::config::ServerConfig;
use plantmon_server::state::AppState;
use plantmon_storage::engine::SqliteStore;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

pub struct TestContext {
    pub state: AppState,
    pub app: axum::Router,
}

pub fn build_test_context() -> TestContext {
    let store = Arc::new(SqliteStore::open_in_memory().expect("in-memory store should open"));
    let engine = Arc::new(Mutex::new(AlertEngine::new()));

    let state = AppState {
        store,
        engine,
        start_time: Utc::now(),
        config: Arc::new(ServerConfig::default()),
    };
    let app = app::build_http_app(state.clone());

    TestContext { state, app }
}

pub async fn request_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    builder = builder.header("Content-Type", "application/json");

    let req_body = body.unwrap_or(Value::Null).to_string();
    let req = builder
        .body(Body::from(req_body))
        .expect("request should build");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");

    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, json, trace_id)
}

pub async fn request_no_body(
    app: &axum::Router,
    method: &str,
    uri: &str,
) -> (StatusCode, Value, Option<String>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");

    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, json, trace_id)
}

/// POST a reading and return (status, response body).
pub async fn post_reading(
    app: &axum::Router,
    device_id: &str,
    temperature: f64,
    gas_level: f64,
) -> (StatusCode, Value) {
    let (status, body, _) = request_json(
        app,
        "POST",
        "/sensor-data",
        Some(json!({
            "device_id": device_id,
            "temperature": temperature,
            "gas_level": gas_level,
        })),
    )
    .await;
    (status, body)
}

pub fn assert_ok_envelope(json: &Value) {
    assert_eq!(json["err_code"], 0);
    assert!(json["err_msg"].is_string());
    assert!(json.get("trace_id").is_some());
}

pub fn assert_err_envelope(json: &Value, err_code: i32) {
    assert_eq!(json["err_code"], err_code);
    assert!(json["err_msg"].is_string());
    assert!(json.get("trace_id").is_some());
    assert!(json["data"].is_null());
}

/// Alert types opened by an ingestion response, in emission order.
pub fn opened_types(body: &Value) -> Vec<String> {
    body["data"]["alerts_opened"]
        .as_array()
        .expect("alerts_opened should be an array")
        .iter()
        .map(|a| a["alert_type"].as_str().expect("alert_type").to_string())
        .collect()
}
